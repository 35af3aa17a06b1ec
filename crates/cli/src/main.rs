use std::path::PathBuf;
use std::process;

use clap::Parser;

use unburn_core::inpainting::infrastructure::cpu_inpainter::CpuInpainter;
use unburn_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use unburn_core::pipeline::run_config::{RunConfig, RunRequest};
use unburn_core::pipeline::video_processor::VideoProcessor;
use unburn_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use unburn_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;

/// Erase burned-in captions, watermarks and labels from a video by
/// inpainting fixed rectangular regions.
#[derive(Parser, Debug)]
#[command(name = "unburn", version)]
struct Cli {
    /// Input video file (overrides the config 'input' key).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output video file (overrides the config 'output' key).
    /// The extension picks the codec: .avi is Motion JPEG, .mp4/.mov/.m4v
    /// is MPEG-4.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Region to erase, repeatable:
    /// [start-end@]x,y,width,height[:radius][:method][:dilation]
    /// e.g. "2-8@100,50,200,80:4:ns:2".
    #[arg(short, long = "region", value_name = "SPEC", allow_hyphen_values = true)]
    regions: Vec<String>,

    /// JSON or TOML file with input, output and a list of regions.
    /// Its regions are applied before any --region flags.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replace the output file if it already exists.
    #[arg(long)]
    overwrite: bool,
}

impl From<Cli> for RunRequest {
    fn from(cli: Cli) -> Self {
        RunRequest {
            input: cli.input,
            output: cli.output,
            region_specs: cli.regions,
            config_path: cli.config,
            overwrite: cli.overwrite,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = RunConfig::assemble(cli.into())?;

    log::info!(
        "Erasing {} region(s) from {}",
        config.regions.len(),
        config.input.display()
    );
    for region in &config.regions {
        log::info!("  {region}");
    }

    let mut processor = VideoProcessor::new(
        Box::new(FfmpegReader::new()),
        Box::new(FfmpegWriter::new()),
        Box::new(CpuInpainter::new()),
        Box::new(StdoutPipelineLogger::new()),
    );
    let report = processor.execute(&config)?;

    log::info!(
        "Output written to {} ({} frames, {} inpainted)",
        config.output.display(),
        report.frames_processed,
        report.frames_inpainted
    );
    Ok(())
}
