use super::{Compositor, ProcessGroup};
use crate::sortlast::comm::{CommError, RunContext};
use crate::sortlast::image::Image;
use crate::sortlast::options::{OptionsError, RunOptions};
use crate::sortlast::telemetry::TelemetryRecorder;
use clap::{value_parser, Arg, ArgMatches, Command};

const MAX_IMAGE_SPLIT: &str = "max-image-split";

#[derive(Clone, Debug, Default)]
pub struct BinarySwap {
    max_image_split: Option<u32>,
}

impl BinarySwap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_image_split(max_image_split: u32) -> Self {
        Self {
            max_image_split: Some(max_image_split),
        }
    }

    fn halves_in_round(&self, round: u32) -> bool {
        self.max_image_split.map_or(true, |limit| round < limit)
    }
}

fn largest_power_of_two(n: usize) -> usize {
    1 << (usize::BITS - 1 - n.max(1).leading_zeros())
}

impl Compositor for BinarySwap {
    fn name(&self) -> &'static str {
        "binary swap"
    }

    fn augment_args(&self, command: Command) -> Command {
        command.arg(
            Arg::new(MAX_IMAGE_SPLIT)
                .long(MAX_IMAGE_SPLIT)
                .value_name("N")
                .value_parser(value_parser!(u32))
                .help("Stop halving the image after N exchange rounds"),
        )
    }

    fn set_options(
        &mut self,
        matches: &ArgMatches,
        options: &RunOptions,
        recorder: &mut TelemetryRecorder,
    ) -> Result<(), OptionsError> {
        match matches.get_one::<u32>(MAX_IMAGE_SPLIT).copied() {
            Some(splits) => {
                let pixels = options.width * options.height;
                let too_fine = splits >= usize::BITS || (1usize << splits) > pixels;
                if splits == 0 || too_fine {
                    return Err(OptionsError::InvalidValue {
                        flag: MAX_IMAGE_SPLIT,
                        value: splits.to_string(),
                        reason: format!("must be positive with 2^N at most {} pixels", pixels),
                    });
                }
                *self = Self::with_max_image_split(splits);
                recorder.add_entry(MAX_IMAGE_SPLIT, splits as i64)?;
            }
            None => {
                *self = Self::new();
                recorder.add_entry(MAX_IMAGE_SPLIT, "unlimited")?;
            }
        }
        Ok(())
    }

    fn compose(&self, mut image: Image, group: &ProcessGroup, ctx: &RunContext) -> Result<Image, CommError> {
        let count = group.len();
        let active = largest_power_of_two(count);
        let extra = count - active;
        let position = group.position();

        // Fold down to a power of two: odd members of the first `extra`
        // pairs hand their whole image to the even neighbour in front.
        if position < 2 * extra {
            if position % 2 == 1 {
                let empty = image.empty_like();
                ctx.send(group.rank_at(position - 1), image)?;
                return Ok(empty);
            }
            let behind = ctx.recv::<Image>(group.rank_at(position + 1))?;
            image.merge(&behind, true)?;
        }

        let slot = if position < 2 * extra {
            position / 2
        } else {
            position - extra
        };
        let member_of_slot = |s: usize| group.rank_at(if s < extra { 2 * s } else { s + extra });

        for round in 0..active.trailing_zeros() {
            let bit = 1usize << round;
            let partner = member_of_slot(slot ^ bit);
            let lower = slot & bit == 0;

            if self.halves_in_round(round) {
                let region = image.region();
                let mid = region.start + region.len() / 2;
                let (keep, give) = if lower {
                    (region.start..mid, mid..region.end)
                } else {
                    (mid..region.end, region.start..mid)
                };
                ctx.send(partner, image.sub_image(give))?;
                let mut kept = image.sub_image(keep);
                let incoming = ctx.recv::<Image>(partner)?;
                kept.merge(&incoming, lower)?;
                image = kept;
            } else if lower {
                let incoming = ctx.recv::<Image>(partner)?;
                image.merge(&incoming, true)?;
            } else {
                let empty = image.empty_like();
                ctx.send(partner, image)?;
                return Ok(empty);
            }
        }

        log::debug!(
            "rank {}: binary swap done, holding pixels {:?}",
            ctx.rank(),
            image.region()
        );
        Ok(image)
    }
}
