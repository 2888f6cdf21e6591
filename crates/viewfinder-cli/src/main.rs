use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use viewfinder_core::{Frame, FrameProcessor, Mode};

mod config;
mod report;

use config::Config;
use report::StatsReport;

#[derive(Parser)]
#[command(name = "viewfinder", about = "Decode, enhance and inspect raw NV21 camera frames")]
struct Cli {
    #[command(flatten)]
    frame: FrameArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FrameArgs {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Frame width in pixels
    #[arg(long, global = true)]
    width: Option<u32>,
    /// Frame height in pixels
    #[arg(long, global = true)]
    height: Option<u32>,
    /// Decode path: original, enhanced, or grayscale
    #[arg(short, long, global = true)]
    mode: Option<Mode>,
    /// Per-bin clip limit for equalization, as a fraction of the frame's pixels
    #[arg(long, global = true)]
    clip_fraction: Option<f64>,
}

impl FrameArgs {
    fn resolve(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(clip_fraction) = self.clip_fraction {
            config.clip_fraction = clip_fraction;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a single frame and print its overlay statistics
    Decode {
        /// Raw NV21 frame file
        input: PathBuf,
        /// Write the decoded frame as PNG
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print statistics for a single frame
    Stats {
        /// Raw NV21 frame file
        input: PathBuf,
        /// Emit JSON including histograms and the tone curve
        #[arg(long)]
        json: bool,
    },
    /// Replay a file of back-to-back frames through one pipeline
    Replay {
        /// Raw NV21 stream file
        input: PathBuf,
        /// Write every decoded frame as PNG into this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.frame.resolve()?;

    match cli.command {
        Commands::Decode { input, output } => {
            let data = read_input(&input)?;
            let mut processor = FrameProcessor::new(config.clip_fraction, config.compute_stats)?;
            let report = processor.process(config.width, config.height, &data, config.mode)?;
            if let Some(path) = output {
                report::save_png(&path, &report)?;
            }
            println!("{} ({}x{})", report.mode, report.width, report.height);
            match report.stats {
                Some(stats) => println!("{stats}"),
                None if config.compute_stats => println!("no statistics"),
                None => {}
            }
        }
        Commands::Stats { input, json } => {
            let data = read_input(&input)?;
            let mut processor = FrameProcessor::new(config.clip_fraction, true)?;
            let report = processor.process(config.width, config.height, &data, config.mode)?;
            if json {
                let summary = StatsReport::from_frame(&report);
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                match report.stats {
                    Some(stats) => println!("{stats}"),
                    None => println!("no statistics"),
                }
            }
        }
        Commands::Replay { input, output_dir } => {
            replay(&config, &input, output_dir.as_deref())?;
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn replay(config: &Config, input: &Path, output_dir: Option<&Path>) -> Result<()> {
    let data = read_input(input)?;
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let (frames, skipped) = replay_frames(config, &data, output_dir)?;
    println!("replayed {frames} frame(s), skipped {skipped}");
    Ok(())
}

/// Feed consecutive frames through one processor, skipping frames that fail.
///
/// Returns the number of frames processed and the number skipped.
fn replay_frames(config: &Config, data: &[u8], output_dir: Option<&Path>) -> Result<(u64, usize)> {
    let frame_len = Frame::byte_len(config.width, config.height)?;
    let mut processor = FrameProcessor::new(config.clip_fraction, config.compute_stats)?;
    let mut skipped = 0usize;

    for (index, chunk) in data.chunks(frame_len).enumerate() {
        let report = match processor.process(config.width, config.height, chunk, config.mode) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(frame = index, error = %e, "skipping frame");
                skipped += 1;
                continue;
            }
        };

        if let Some(dir) = output_dir {
            report::save_png(&dir.join(format!("frame_{index:05}.png")), &report)?;
        }
        match report.stats {
            Some(stats) => println!("frame {index}:\n{stats}"),
            None => println!("frame {index}"),
        }
    }

    Ok((processor.frames(), skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_config(width: u32, height: u32, mode: Mode) -> Config {
        Config {
            width,
            height,
            mode,
            ..Config::default()
        }
    }

    #[test]
    fn test_replay_skips_trailing_partial_frame() {
        // Two full 2x2 frames (6 bytes each) and half of a third.
        let data = vec![128u8; 15];
        let counts = replay_frames(&frame_config(2, 2, Mode::Enhanced), &data, None).unwrap();
        assert_eq!(counts, (2, 1));
    }

    #[test]
    fn test_replay_whole_frames() {
        let data = vec![200u8; 4 * 4 * 3 / 2 * 3];
        let counts = replay_frames(&frame_config(4, 4, Mode::Grayscale), &data, None).unwrap();
        assert_eq!(counts, (3, 0));
    }

    #[test]
    fn test_replay_rejects_odd_dimensions() {
        assert!(replay_frames(&frame_config(3, 2, Mode::Original), &[0; 9], None).is_err());
    }

    #[test]
    fn test_replay_empty_input() {
        let counts = replay_frames(&Config::default(), &[], None).unwrap();
        assert_eq!(counts, (0, 0));
    }
}
