mod binary_swap;
mod group;

pub use binary_swap::BinarySwap;
pub use group::ProcessGroup;

use crate::sortlast::comm::{CommError, RunContext};
use crate::sortlast::image::Image;
use crate::sortlast::options::{OptionsError, RunOptions};
use crate::sortlast::telemetry::TelemetryRecorder;
use clap::{ArgMatches, Command};

pub trait Compositor: Send + Sync {
    fn name(&self) -> &'static str;

    fn augment_args(&self, command: Command) -> Command {
        command
    }

    fn set_options(
        &mut self,
        matches: &ArgMatches,
        options: &RunOptions,
        recorder: &mut TelemetryRecorder,
    ) -> Result<(), OptionsError>;

    // Merges the images of every member of `group`. Members are listed
    // front to back; the returned image holds some part of the merged
    // frame, possibly nothing.
    fn compose(&self, image: Image, group: &ProcessGroup, ctx: &RunContext) -> Result<Image, CommError>;

    fn gather(&self, image: Image, root: usize, ctx: &RunContext) -> Result<Option<Image>, CommError> {
        image.gather(root, ctx)
    }
}
