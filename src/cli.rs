//! Command-line arguments.

use clap::{ArgAction, Parser};
use scan_batcher_calculator::Rounding;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Recommend scan resolutions and drive scanning software through batches of photos")]
pub struct Args {
    /// Workflow directory (containing `workflow.ini`)
    #[arg(short, long, value_name = "DIR")]
    pub workflow: Option<PathBuf>,
    /// Workflow engine [default: vuescan]
    #[arg(short, long)]
    pub engine: Option<String>,
    /// Batch type: `scan` (default), `calculate`, or `process FOLDER [PATTERN]`
    #[arg(short, long, num_args = 1..=3, value_name = "KIND")]
    pub batch: Vec<String>,
    /// Photo width in centimeters
    #[arg(long, visible_alias = "pw", value_parser = positive_float)]
    pub photo_width: Option<f64>,
    /// Photo height in centimeters
    #[arg(long, visible_alias = "ph", value_parser = positive_float)]
    pub photo_height: Option<f64>,
    /// Desired image width in pixels
    #[arg(long, visible_alias = "iw", value_parser = clap::value_parser!(u32).range(1..))]
    pub image_width: Option<u32>,
    /// Desired image height in pixels
    #[arg(long, visible_alias = "ih", value_parser = clap::value_parser!(u32).range(1..))]
    pub image_height: Option<u32>,
    /// Minimum scan resolution in DPI
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub min_dpi: Option<u32>,
    /// Maximum scan resolution in DPI
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_dpi: Option<u32>,
    /// Resolutions supported by the scanner, e.g. `--dpis 300 600 1200`
    #[arg(long, num_args = 1.., value_delimiter = ',', value_parser = clap::value_parser!(u32).range(1..))]
    pub dpis: Vec<u32>,
    /// How to round the calculated resolution to a supported one [default: nr]
    #[arg(short, long, value_enum)]
    pub rounding: Option<Rounding>,
    /// Extra template values, e.g. `-t album=family year=1975`
    #[arg(short, long = "templates", num_args = 1.., value_name = "KEY=VALUE", value_parser = key_value)]
    pub templates: Vec<(String, String)>,
    /// Installation settings file of the workflow engine
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,
    /// Additional defaults file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Log file [default: scan-batcher.log]
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
    /// More terminal output (-v, -vv, -vvv)
    #[arg(short, action = ArgAction::Count)]
    pub verbose: u8,
    /// Less terminal output (-q, -qq)
    #[arg(short, action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}
impl Args {
    /// Level of events echoed to the terminal; the log file is configured separately.
    pub fn terminal_level(&self) -> LevelFilter {
        match i16::from(self.verbose) - i16::from(self.quiet) {
            ..=-2 => LevelFilter::OFF,
            -1 => LevelFilter::ERROR,
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

fn positive_float(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        Ok(_) => Err("must be a positive number".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("invalid template '{s}', expected KEY=VALUE")),
    }
}
