use crate::sortlast::camera::Camera;
use crate::sortlast::comm::{CommError, RunContext, World};
use crate::sortlast::composite::{Compositor, ProcessGroup};
use crate::sortlast::distribute::Distribution;
use crate::sortlast::image::ImageError;
use crate::sortlast::loader::{make_box, read_stl, LoadError};
use crate::sortlast::mesh::Mesh;
use crate::sortlast::options::{self, GeometrySource, OptionsError, Parsed, RunOptions};
use crate::sortlast::paint::render_local;
use crate::sortlast::telemetry::{Stopwatch, TelemetryError, TelemetryRecorder};
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

const ROOT: usize = 0;

// Factor applied to every color component when blending is order
// dependent, so that geometry behind other geometry stays visible.
const TRANSPARENCY_SCALE: f32 = 0.5;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("{0}")]
    Options(OptionsError),
    #[error("error: {source}\n\n{usage}")]
    Rejected { source: OptionsError, usage: String },
    #[error("error: cannot read geometry from {}: {source}", .path.display())]
    Load { path: PathBuf, source: LoadError },
    #[error("error: {0}")]
    Comm(#[from] CommError),
    #[error("error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("error: {0}")]
    Image(#[from] ImageError),
}

impl RunError {
    fn is_disconnect(&self) -> bool {
        matches!(self, RunError::Comm(CommError::Disconnected { .. }))
    }
}

pub enum Launch {
    Run(App),
    Help(String),
}

pub struct App {
    options: RunOptions,
    compositor: Box<dyn Compositor>,
    recorder: TelemetryRecorder,
}

impl App {
    pub fn from_args<I, T>(args: I, mut compositor: Box<dyn Compositor>) -> Result<Launch, RunError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match options::parse_args(args, compositor.as_mut()) {
            Ok(Parsed::Help(text)) => Ok(Launch::Help(text)),
            Ok(Parsed::Run { options, recorder }) => Ok(Launch::Run(App {
                options,
                compositor,
                recorder,
            })),
            Err(source @ OptionsError::Parse(_)) => Err(RunError::Options(source)),
            Err(source) => Err(RunError::Rejected {
                usage: options::usage(compositor.as_ref()),
                source,
            }),
        }
    }

    fn load_geometry(&mut self) -> Result<Mesh, RunError> {
        let (mesh, kind) = match &self.options.geometry {
            GeometrySource::Box => (make_box(), "procedural box"),
            GeometrySource::StlFile(path) => {
                let mesh = read_stl(path).map_err(|source| RunError::Load {
                    path: path.clone(),
                    source,
                })?;
                (mesh, "STL mesh")
            }
        };
        log::info!(
            "Loaded {} with {} triangles",
            self.options.geometry.label(),
            mesh.triangle_count()
        );

        self.recorder.add_entry("geometry", self.options.geometry.label())?;
        self.recorder.add_entry(
            "geometry-description",
            format!("{}, {} triangles", kind, mesh.triangle_count()),
        )?;
        self.recorder
            .add_entry("geometry-distribution", self.options.distribution.label())?;
        if let Distribution::Duplicate { overlap } = self.options.distribution {
            self.recorder.add_entry("geometry-overlap", overlap)?;
        }
        Ok(mesh)
    }

    pub fn run(mut self) -> Result<(), RunError> {
        let source = self.load_geometry()?;

        let world = World::new(self.options.num_processes);
        log::info!(
            "Rendering {}x{} on {} ranks",
            self.options.width,
            self.options.height,
            world.size()
        );
        let results = world.run(|ctx| self.run_rank(ctx, ctx.is_root().then(|| source.clone())))?;

        let mut report = None;
        let mut failure: Option<RunError> = None;
        for result in results {
            match result {
                Ok(recorder) => report = report.or(recorder),
                Err(err) => {
                    if failure.as_ref().map_or(true, RunError::is_disconnect) {
                        failure = Some(err);
                    }
                }
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }

        if let Some(recorder) = report {
            recorder.write_yaml(&self.options.yaml_output)?;
        }
        Ok(())
    }

    fn run_rank(&self, ctx: &RunContext, source: Option<Mesh>) -> Result<Option<TelemetryRecorder>, RunError> {
        let options = &self.options;
        if ctx.is_root() {
            log::info!("Rank {} on pid {}", ctx.rank(), std::process::id());
        }
        let mut recorder = self.recorder.clone();

        let mut mesh = options.distribution.distribute(source, ctx)?;
        if options.format.order_dependent_blend() {
            mesh.scale_colors(TRANSPARENCY_SCALE);
        }

        let num_triangles = ctx.all_reduce_sum(mesh.triangle_count() as u64)?;
        recorder.add_entry("num-triangles", num_triangles)?;

        let camera = Camera::build(&mesh.bounds(), options.width, options.height, ctx)?;
        let group = if options.format.order_dependent_blend() {
            ProcessGroup::by_view_distance(&mesh.bounds(), &camera, ctx)?
        } else {
            ProcessGroup::world(ctx)
        };
        log::debug!(
            "rank {}: {} local triangles, composite order {:?}",
            ctx.rank(),
            mesh.triangle_count(),
            group.members()
        );

        let mut image = options.format.allocate(options.width, options.height);

        let paint = Stopwatch::start();
        render_local(&options.painter, mesh.triangles(), &mut image, &camera);
        let paint_seconds = paint.elapsed_secs();

        let local_painting = options.write_images.then(|| image.clone());

        let rest = Stopwatch::start();
        ctx.barrier()?;
        let composite = Stopwatch::start();
        let composed = self.compositor.compose(image, &group, ctx)?;
        let frame = self.compositor.gather(composed, ROOT, ctx)?;
        let composite_seconds = composite.elapsed_secs();
        let total_seconds = paint_seconds + rest.elapsed_secs();

        recorder.add_entry("paint-seconds", paint_seconds)?;
        recorder.add_entry("composite-seconds", composite_seconds)?;
        recorder.add_entry("total-seconds", total_seconds)?;

        if let Some(local) = local_painting {
            local.save_ppm(options.image_dir.join(format!("local_painting{}.ppm", ctx.rank())))?;
            if let Some(frame) = &frame {
                frame.save_ppm(options.image_dir.join("composite.ppm"))?;
            }
        }

        if ctx.rank() == ROOT {
            log::info!(
                "paint {:.4}s, composite {:.4}s, total {:.4}s",
                paint_seconds,
                composite_seconds,
                total_seconds
            );
            Ok(Some(recorder))
        } else {
            Ok(None)
        }
    }
}
