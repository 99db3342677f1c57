//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.yolodesc.toml` files.

use crate::cli::SummaryFormat;
use crate::models::{COCO_CLASS_NAMES, DEFAULT_CLASS_COUNT};
use crate::video::VideoBackend;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".yolodesc.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Descriptor settings.
    #[serde(default)]
    pub descriptor: DescriptorConfig,

    /// Video probing settings.
    #[serde(default)]
    pub video: VideoConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Descriptor table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorConfig {
    /// Number of detection classes (table columns).
    #[serde(default = "default_class_count")]
    pub class_count: usize,

    /// Class labels used in summary reports.
    #[serde(default = "default_class_names")]
    pub class_names: Vec<String>,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            class_count: default_class_count(),
            class_names: default_class_names(),
        }
    }
}

fn default_class_count() -> usize {
    DEFAULT_CLASS_COUNT
}

fn default_class_names() -> Vec<String> {
    COCO_CLASS_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Video probing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Backend used to read the frame count.
    #[serde(default)]
    pub backend: VideoBackend,

    /// ffprobe executable.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            backend: VideoBackend::default(),
            ffprobe_path: default_ffprobe_path(),
        }
    }
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Format of the optional summary report.
    #[serde(default)]
    pub summary_format: SummaryFormat,

    /// Draw a progress bar while aggregating.
    #[serde(default = "default_true")]
    pub progress: bool,

    /// Read the written table back and compare.
    #[serde(default)]
    pub verify: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary_format: SummaryFormat::default(),
            progress: true,
            verify: false,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.descriptor.class_count == 0 {
            anyhow::bail!("descriptor.class_count must be at least 1");
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(classes) = args.classes {
            self.descriptor.class_count = classes;
        }

        if let Some(backend) = args.backend {
            self.video.backend = backend;
        }
        if let Some(ref ffprobe) = args.ffprobe {
            self.video.ffprobe_path = ffprobe.clone();
        }

        if let Some(format) = args.format {
            self.output.summary_format = format;
        }

        // Flags only switch things on or off, never back
        if !args.show_progress() {
            self.output.progress = false;
        }
        if args.verify {
            self.output.verify = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.descriptor.class_count, 80);
        assert_eq!(config.descriptor.class_names.len(), 80);
        assert_eq!(config.video.backend, VideoBackend::Auto);
        assert_eq!(config.video.ffprobe_path, "ffprobe");
        assert!(config.output.progress);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[descriptor]
class_count = 3
class_names = ["person", "car", "dog"]

[video]
backend = "ffprobe"
ffprobe_path = "/opt/ffmpeg/bin/ffprobe"

[output]
summary_format = "json"
progress = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.descriptor.class_count, 3);
        assert_eq!(config.descriptor.class_names, vec!["person", "car", "dog"]);
        assert_eq!(config.video.backend, VideoBackend::Ffprobe);
        assert_eq!(config.video.ffprobe_path, "/opt/ffmpeg/bin/ffprobe");
        assert_eq!(config.output.summary_format, SummaryFormat::Json);
        assert!(!config.output.progress);
        assert!(!config.output.verify);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[descriptor]\nclass_count = 20\n").unwrap();
        assert_eq!(config.descriptor.class_count, 20);
        assert_eq!(config.descriptor.class_names.len(), 80);
        assert_eq!(config.video.backend, VideoBackend::Auto);
    }

    #[test]
    fn test_load_rejects_zero_classes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[descriptor]\nclass_count = 0\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let args = Args::try_parse_from([
            "yolodesc",
            "a.mp4",
            "a.yolo",
            "a.desc",
            "--classes",
            "10",
            "--backend",
            "ffprobe",
            "--ffprobe",
            "/usr/local/bin/ffprobe",
            "--no-progress",
            "--verify",
        ])
        .unwrap();

        let mut config = Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.descriptor.class_count, 10);
        assert_eq!(config.video.backend, VideoBackend::Ffprobe);
        assert_eq!(config.video.ffprobe_path, "/usr/local/bin/ffprobe");
        assert!(!config.output.progress);
        assert!(config.output.verify);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[descriptor]"));
        assert!(toml_str.contains("[video]"));
        assert!(toml_str.contains("[output]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.descriptor.class_count, 80);
    }
}
