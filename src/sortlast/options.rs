use crate::sortlast::composite::Compositor;
use crate::sortlast::distribute::Distribution;
use crate::sortlast::image::{ColorFormat, DepthFormat, ImageFormat};
use crate::sortlast::paint::PainterBackend;
use crate::sortlast::telemetry::{TelemetryError, TelemetryRecorder};
use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("{0}")]
    Parse(#[from] clap::Error),
    #[error("invalid value '{value}' for --{flag}: {reason}")]
    InvalidValue {
        flag: &'static str,
        value: String,
        reason: String,
    },
    #[error("painter '{0}' is not built into this binary")]
    PainterUnavailable(&'static str),
    #[error("{0}")]
    Telemetry(#[from] TelemetryError),
}

#[derive(Clone, Debug, PartialEq)]
pub enum GeometrySource {
    Box,
    StlFile(PathBuf),
}

impl GeometrySource {
    pub fn label(&self) -> String {
        match self {
            GeometrySource::Box => "box".to_string(),
            GeometrySource::StlFile(path) => path.display().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunOptions {
    pub width: usize,
    pub height: usize,
    pub yaml_output: PathBuf,
    pub write_images: bool,
    pub image_dir: PathBuf,
    pub painter: PainterBackend,
    pub geometry: GeometrySource,
    pub distribution: Distribution,
    pub format: ImageFormat,
    pub num_processes: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            width: 1100,
            height: 900,
            yaml_output: PathBuf::from("timing.yaml"),
            write_images: true,
            image_dir: PathBuf::from("."),
            painter: PainterBackend::default(),
            geometry: GeometrySource::Box,
            distribution: Distribution::default(),
            format: ImageFormat::default(),
            num_processes: 4,
        }
    }
}

#[derive(Debug)]
pub enum Parsed {
    Run {
        options: RunOptions,
        recorder: TelemetryRecorder,
    },
    Help(String),
}

fn switch(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).action(ArgAction::SetTrue).help(help)
}

fn positive(id: &'static str, default: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .value_name("N")
        .value_parser(value_parser!(u32).range(1..))
        .default_value(default)
        .help(help)
}

pub fn build_command(compositor: &dyn Compositor) -> Command {
    let command = Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .about("Sort-last parallel rendering and compositing benchmark")
        .args_override_self(true)
        .arg(positive("width", "1100", "Width of the image"))
        .arg(positive("height", "900", "Height of the image"))
        .arg(
            Arg::new("yaml-output")
                .long("yaml-output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .default_value("timing.yaml")
                .help("File the timing report is written to"),
        )
        .arg(
            switch("enable-write-image", "Save local and composite images as PPM files")
                .overrides_with("disable-write-image"),
        )
        .arg(
            switch("disable-write-image", "Skip writing images")
                .overrides_with("enable-write-image"),
        )
        .arg(
            switch("paint-simple-raster", "Paint with the serial rasterizer (default)")
                .overrides_with_all(["paint-tiled-raster", "paint-opengl"]),
        )
        .arg(
            switch("paint-tiled-raster", "Paint horizontal bands of the image in parallel")
                .overrides_with_all(["paint-simple-raster", "paint-opengl"]),
        )
        .arg(
            switch("paint-opengl", "Paint with OpenGL")
                .overrides_with_all(["paint-simple-raster", "paint-tiled-raster"]),
        )
        .arg(switch("box", "Render a procedural box (default)").overrides_with("stl-file"))
        .arg(
            Arg::new("stl-file")
                .long("stl-file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .overrides_with("box")
                .help("Render the triangles of an STL file"),
        )
        .arg(
            switch("duplicate-geometry", "Give every process a translated copy (default)")
                .overrides_with("divide-geometry"),
        )
        .arg(
            switch("divide-geometry", "Split the triangles among processes")
                .overrides_with("duplicate-geometry"),
        )
        .arg(
            Arg::new("overlap")
                .long("overlap")
                .value_name("FRACTION")
                .value_parser(value_parser!(f32))
                .allow_negative_numbers(true)
                .help("Overlap of duplicated geometry; negative leaves gaps (default -0.05)"),
        )
        .arg(switch("color-ubyte", "8-bit color channels (default)").overrides_with("color-float"))
        .arg(switch("color-float", "Floating point color channels").overrides_with("color-ubyte"))
        .arg(switch("depth-float", "Floating point depth buffer (default)").overrides_with("depth-none"))
        .arg(
            switch("depth-none", "No depth buffer; blend back to front").overrides_with("depth-float"),
        )
        .arg(positive("num-processes", "4", "Number of ranks to run"));

    compositor.augment_args(command)
}

fn read_options(matches: &ArgMatches) -> Result<RunOptions, OptionsError> {
    let positive = |id: &str| matches.get_one::<u32>(id).copied().unwrap_or(1) as usize;

    if matches.get_flag("paint-opengl") {
        return Err(OptionsError::PainterUnavailable("opengl"));
    }
    let painter = if matches.get_flag("paint-tiled-raster") {
        PainterBackend::TiledRaster
    } else {
        PainterBackend::SimpleRaster
    };

    let geometry = match matches.get_one::<PathBuf>("stl-file") {
        Some(path) => GeometrySource::StlFile(path.clone()),
        None => GeometrySource::Box,
    };

    let overlap = matches.get_one::<f32>("overlap").copied();
    let distribution = if matches.get_flag("divide-geometry") {
        if overlap.is_some() {
            log::warn!("--overlap has no effect with --divide-geometry");
        }
        Distribution::Divide
    } else {
        Distribution::Duplicate {
            overlap: overlap.unwrap_or(Distribution::DEFAULT_OVERLAP),
        }
    };

    let color = if matches.get_flag("color-float") {
        ColorFormat::Float
    } else {
        ColorFormat::UByte
    };
    let depth = if matches.get_flag("depth-none") {
        DepthFormat::None
    } else {
        DepthFormat::Float
    };

    Ok(RunOptions {
        width: positive("width"),
        height: positive("height"),
        yaml_output: matches
            .get_one::<PathBuf>("yaml-output")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("timing.yaml")),
        write_images: !matches.get_flag("disable-write-image"),
        painter,
        geometry,
        distribution,
        format: ImageFormat::new(color, depth),
        num_processes: positive("num-processes"),
        ..RunOptions::default()
    })
}

pub fn parse_args<I, T>(args: I, compositor: &mut dyn Compositor) -> Result<Parsed, OptionsError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = build_command(compositor);
    let matches = match command.try_get_matches_from_mut(args) {
        Ok(matches) => matches,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(Parsed::Help(err.to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    let options = read_options(&matches)?;

    let mut recorder = TelemetryRecorder::new();
    recorder.add_entry("composite-algorithm", compositor.name())?;
    recorder.add_entry("num-processes", options.num_processes)?;
    compositor.set_options(&matches, &options, &mut recorder)?;
    recorder.add_entry("image-width", options.width)?;
    recorder.add_entry("image-height", options.height)?;
    recorder.add_entry("painter", options.painter.label())?;
    recorder.add_entry("depth-buffer-format", options.format.depth_label())?;
    recorder.add_entry("color-buffer-format", options.format.color_label())?;
    let order_dependent = if options.format.order_dependent_blend() {
        "yes"
    } else {
        "no"
    };
    recorder.add_entry("rendering-order-dependent", order_dependent)?;

    Ok(Parsed::Run { options, recorder })
}

pub fn usage(compositor: &dyn Compositor) -> String {
    build_command(compositor).render_usage().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sortlast::composite::BinarySwap;
    use crate::sortlast::telemetry::Value;

    fn parse(args: &[&str]) -> Result<Parsed, OptionsError> {
        let mut compositor = BinarySwap::new();
        parse_args(std::iter::once("sortlast-bench").chain(args.iter().copied()), &mut compositor)
    }

    fn run_options(args: &[&str]) -> (RunOptions, TelemetryRecorder) {
        match parse(args).unwrap() {
            Parsed::Run { options, recorder } => (options, recorder),
            Parsed::Help(_) => panic!("unexpected help"),
        }
    }

    #[test]
    fn defaults() {
        let (options, recorder) = run_options(&[]);
        assert_eq!(options, RunOptions::default());
        let keys: Vec<_> = recorder.keys().collect();
        assert_eq!(
            keys,
            [
                "composite-algorithm",
                "num-processes",
                "max-image-split",
                "image-width",
                "image-height",
                "painter",
                "depth-buffer-format",
                "color-buffer-format",
                "rendering-order-dependent",
            ]
        );
    }

    #[test]
    fn help_is_not_an_error() {
        for flag in ["--help", "-h"] {
            match parse(&[flag]).unwrap() {
                Parsed::Help(text) => assert!(text.contains("--width")),
                other => panic!("expected help, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_unknown_and_positional() {
        assert!(matches!(parse(&["--no-such-flag"]), Err(OptionsError::Parse(_))));
        assert!(matches!(parse(&["model.stl"]), Err(OptionsError::Parse(_))));
    }

    #[test]
    fn rejects_non_positive_width() {
        assert!(parse(&["--width=0"]).is_err());
        assert!(parse(&["--width=-3"]).is_err());
        assert!(parse(&["--width=abc"]).is_err());
    }

    #[test]
    fn width_is_recorded() {
        let (options, recorder) = run_options(&["--width=800"]);
        assert_eq!(options.width, 800);
        assert_eq!(recorder.get("image-width"), Some(&Value::Int(800)));
    }

    #[test]
    fn last_exclusive_flag_wins() {
        let (options, _) = run_options(&["--depth-none", "--depth-float", "--color-float"]);
        assert_eq!(options.format, ImageFormat::new(ColorFormat::Float, DepthFormat::Float));

        let (options, _) = run_options(&["--disable-write-image", "--enable-write-image"]);
        assert!(options.write_images);

        let (options, _) = run_options(&["--stl-file=a.stl", "--box"]);
        assert_eq!(options.geometry, GeometrySource::Box);

        let (options, _) = run_options(&["--box", "--stl-file=a.stl"]);
        assert_eq!(options.geometry, GeometrySource::StlFile(PathBuf::from("a.stl")));
    }

    #[test]
    fn repeated_flags_keep_the_last() {
        let (options, recorder) = run_options(&["--width=800", "--width=900"]);
        assert_eq!(options.width, 900);
        assert_eq!(recorder.get("image-width"), Some(&Value::Int(900)));

        let (options, _) = run_options(&["--depth-none", "--depth-none", "--box", "--box"]);
        assert_eq!(options.format.depth(), DepthFormat::None);
        assert_eq!(options.geometry, GeometrySource::Box);

        let (options, _) = run_options(&["--overlap=0.1", "--overlap=0.2"]);
        assert_eq!(options.distribution, Distribution::Duplicate { overlap: 0.2 });
    }

    #[test]
    fn opengl_painter_is_rejected() {
        assert!(matches!(parse(&["--paint-opengl"]), Err(OptionsError::PainterUnavailable(_))));
        let (options, recorder) = run_options(&["--paint-opengl", "--paint-tiled-raster"]);
        assert_eq!(options.painter, PainterBackend::TiledRaster);
        assert_eq!(recorder.get("painter"), Some(&Value::Text("tiled".into())));
    }

    #[test]
    fn order_dependence_follows_depth_buffer() {
        let (_, recorder) = run_options(&["--depth-none"]);
        assert_eq!(recorder.get("rendering-order-dependent"), Some(&Value::Text("yes".into())));
        assert_eq!(recorder.get("depth-buffer-format"), Some(&Value::Text("none".into())));
    }

    #[test]
    fn overlap_accepts_negative_values() {
        let (options, _) = run_options(&["--overlap", "-0.5"]);
        assert_eq!(options.distribution, Distribution::Duplicate { overlap: -0.5 });
        let (options, _) = run_options(&["--divide-geometry", "--overlap=0.3"]);
        assert_eq!(options.distribution, Distribution::Divide);
    }

    #[test]
    fn compositor_option_is_validated() {
        assert!(matches!(
            parse(&["--width=2", "--height=2", "--max-image-split=3"]),
            Err(OptionsError::InvalidValue { .. })
        ));
        assert!(parse(&["--max-image-split=3"]).is_ok());
    }
}
