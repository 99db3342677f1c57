//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::video::VideoBackend;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// YoloDesc - per-frame YOLO class-count descriptors
///
/// Reads a YOLO detection log (frame-group headers followed by detection
/// records) and writes one comma-separated row of class counts per video
/// frame. The video is only used to learn how many frames to emit.
///
/// Examples:
///   yolodesc clip.mp4 clip.yolo clip.desc
///   yolodesc clip.mp4 clip.yolo clip.desc --frames 1800
///   yolodesc clip.mp4 clip.yolo clip.desc --summary clip.md
///   yolodesc --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Video the detections were extracted from
    #[arg(value_name = "VIDEO", required_unless_present = "init_config")]
    pub video: Option<PathBuf>,

    /// YOLO detection log
    #[arg(value_name = "DETECTIONS", required_unless_present = "init_config")]
    pub detections: Option<PathBuf>,

    /// Output file for the descriptor table
    #[arg(value_name = "OUTPUT", required_unless_present = "init_config")]
    pub output: Option<PathBuf>,

    /// Number of frames to emit instead of probing the video
    #[arg(short, long, value_name = "COUNT")]
    pub frames: Option<usize>,

    /// Number of detection classes (columns per row)
    ///
    /// Defaults to 80, the COCO class set.
    #[arg(short = 'k', long, value_name = "COUNT", env = "YOLODESC_CLASSES")]
    pub classes: Option<usize>,

    /// How to read the video's frame count
    #[arg(long, value_name = "BACKEND")]
    pub backend: Option<VideoBackend>,

    /// ffprobe executable used by the ffprobe backend
    #[arg(long, value_name = "PATH", env = "FFPROBE_PATH")]
    pub ffprobe: Option<String>,

    /// Also write a per-class summary report to this file
    #[arg(short, long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Summary report format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<SummaryFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .yolodesc.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Read the written table back and check it matches
    #[arg(long)]
    pub verify: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .yolodesc.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Format for the summary report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.classes == Some(0) {
            return Err("Class count must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.format.is_some() && self.summary.is_none() {
            return Err("--format only applies together with --summary".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Whether the aggregation progress bar should be drawn.
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress
    }
}
