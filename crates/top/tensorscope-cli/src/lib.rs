//! The `tensorscope` command line tool.
//!
//! Reads a flat textual tensor dump, reshapes it to a known shape and renders it to a PNG.
//!
//! Environment variables:
//!
//! * `RUST_LOG`: what to print on stderr (default `info`).
//! * `TENSORSCOPE_LOG_FILE`: where the per-run debug log goes (default `optical_flow_debug.log`).

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Subcommand;
use ts_log::{FileLogger, LevelFilter, LogSink, ResultExt as _};
use ts_render::{Colormap, FlowField, FlowPanelOptions, OverlayStyle};
use ts_tensor::{Normalization, PayloadEncoding, ShapeSpec};

/// Render tensor dumps to images.
#[derive(Debug, clap::Parser)]
#[clap(author, version, about)]
pub struct Args {
    /// File that receives the debug log of this run. Appended to, never truncated.
    #[clap(
        long,
        global = true,
        env = "TENSORSCOPE_LOG_FILE",
        default_value = "optical_flow_debug.log"
    )]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the x and y components of an optical-flow tensor side by side.
    Flow(FlowArgs),

    /// Show an image tensor, optionally with detection boxes on top.
    Image(ImageArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct FlowArgs {
    /// The tensor dump to read.
    #[clap(long, default_value = "output.txt")]
    pub input: PathBuf,

    /// `json` (an object or array of numbers) or `lines` (one integer per line).
    #[clap(long, default_value_t = PayloadEncoding::JsonValues)]
    pub encoding: PayloadEncoding,

    /// Must be `(1, 2, height, width)`.
    #[clap(long, default_value = "1,2,432,768")]
    pub shape: ShapeSpec,

    #[clap(long, default_value_t = Colormap::Jet)]
    pub colormap: Colormap,

    /// Where to write the PNG.
    #[clap(long, default_value = "optical_flow.png")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ImageArgs {
    /// The tensor dump to read.
    #[clap(long, default_value = "src/utils/tensorData.txt")]
    pub input: PathBuf,

    /// `json` (an object or array of numbers) or `lines` (one integer per line).
    #[clap(long, default_value_t = PayloadEncoding::LineIntegers)]
    pub encoding: PayloadEncoding,

    /// `(height, width)` or `(height, width, 1|3|4)`.
    #[clap(long, default_value = "300,300,3")]
    pub shape: ShapeSpec,

    /// Pixel values are divided by this before display.
    #[clap(long, default_value_t = 255.0)]
    pub scale: f64,

    /// A JSON array of `{"bbox": [x, y, width, height], "class": "person", "score": 0.95}`.
    ///
    /// Without it, the image is rendered without any boxes.
    #[clap(long)]
    pub detections: Option<PathBuf>,

    /// Where to write the PNG.
    #[clap(long, default_value = "image.png")]
    pub output: PathBuf,
}

// ----------------------------------------------------------------------------

/// Parse the command line, run it and return an exit code.
///
/// Failures of the command itself are logged and turned into exit code `1`.
pub fn run<I, T>(args: I) -> anyhow::Result<u8>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    use clap::Parser as _;
    let args = Args::parse_from(args);

    let sink = open_log_file(&args.log_file);

    let result = run_command(&args.command, &sink, &mut std::io::stdout().lock());
    sink.flush();

    match result {
        Ok(()) => Ok(0),
        Err(err) => {
            ts_log::error!("{}", format_error_chain(&*err));
            Ok(1)
        }
    }
}

/// A [`FileLogger`] at debug level, or the global logger if the file can't be opened.
pub fn open_log_file(path: &Path) -> LogSink {
    FileLogger::new(path, LevelFilter::Debug)
        .map(LogSink::new)
        .warn_on_err(&LogSink::global(), "Logging to stderr instead")
        .unwrap_or_else(LogSink::global)
}

/// Run one command. Errors are logged to `sink` before they are returned.
///
/// Detection labels are printed to `out`, one per line.
pub fn run_command(
    command: &Command,
    sink: &LogSink,
    out: &mut dyn std::io::Write,
) -> anyhow::Result<()> {
    let result = match command {
        Command::Flow(args) => run_flow(args, sink),
        Command::Image(args) => run_image(args, sink, out),
    };

    if let Err(err) = &result {
        sink.error(format_args!("ERROR: {}", format_error_chain(&**err)));
    }

    result
}

pub fn run_flow(args: &FlowArgs, sink: &LogSink) -> anyhow::Result<()> {
    sink.debug(format_args!("Loading data from file: {}", args.input.display()));
    let tensor = ts_tensor::deserialize_file(&args.input, args.encoding, &args.shape)
        .with_context(|| format!("Failed to load optical flow from {:?}", args.input))?;
    sink.debug(format_args!("Data reshaped to: {}", tensor.shape()));

    let flow = FlowField::from_tensor(&tensor)?;
    sink.debug(format_args!(
        "X and Y components of optical flow extracted ({}x{})",
        flow.width(),
        flow.height()
    ));

    let range = flow.magnitude_range();
    sink.debug(format_args!(
        "Magnitude of optical flow calculated: {} to {}",
        range.min, range.max
    ));

    let options = FlowPanelOptions {
        colormap: args.colormap,
        ..Default::default()
    };
    let panels = ts_render::render_flow_panels(&flow, &options)?;

    ts_render::save_png(&panels, &args.output)?;
    sink.debug(format_args!(
        "Optical flow visualized successfully: {}",
        args.output.display()
    ));

    Ok(())
}

pub fn run_image(
    args: &ImageArgs,
    sink: &LogSink,
    out: &mut dyn std::io::Write,
) -> anyhow::Result<()> {
    let normalization = Normalization::divide_by(args.scale)?;

    sink.debug(format_args!("Loading data from file: {}", args.input.display()));
    let tensor = ts_tensor::deserialize_file(&args.input, args.encoding, &args.shape)
        .with_context(|| format!("Failed to load image from {:?}", args.input))?;
    sink.debug(format_args!("Data reshaped to: {}", tensor.shape()));

    let tensor = tensor.normalized(normalization);
    let mut image = ts_render::tensor_to_rgb_image(&tensor)?;

    let detections = args
        .detections
        .as_deref()
        .map(|path| {
            ts_tensor::load_detections(path)
                .with_context(|| format!("Failed to load detections from {path:?}"))
        })
        .transpose()?;

    let annotations = ts_render::annotations_for(detections.as_deref());
    ts_render::draw_annotations(&mut image, &annotations, &OverlayStyle::default());
    for annotation in &annotations {
        sink.info(format_args!(
            "{} at ({}, {}) size {}x{}",
            annotation.label, annotation.x, annotation.y, annotation.width, annotation.height
        ));
        writeln!(out, "{}", annotation.label).warn_on_err(sink, "Failed to print label");
    }

    ts_render::save_png(&image, &args.output)?;
    sink.debug(format_args!("Image saved to {}", args.output.display()));

    Ok(())
}

/// Format an error, including its chain of sources.
///
/// Always use this when displaying an error, especially `anyhow::Error`.
pub fn format_error_chain(error: &dyn std::error::Error) -> String {
    // ": " separated, like anyhow's `format!("{:#}", err)`.
    let mut string = error.to_string();
    for source in std::iter::successors(error.source(), |error| error.source()) {
        string.push_str(": ");
        string.push_str(&source.to_string());
    }
    string
}
