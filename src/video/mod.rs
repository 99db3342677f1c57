//! Video frame-count probing.
//!
//! The descriptor table needs one fact from the video: how many frames it
//! has. This module obtains it from the container metadata, either through
//! the `ffprobe` executable or, with the `ffmpeg` feature, through the
//! linked FFmpeg libraries. A frame count given on the command line skips
//! probing entirely.

#[cfg(feature = "ffmpeg")]
mod ffmpeg;
pub mod ffprobe;

use crate::models::FrameSource;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Which mechanism reads the frame count.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum VideoBackend {
    /// FFmpeg libraries when compiled in, otherwise ffprobe
    #[default]
    Auto,
    /// Run the ffprobe executable
    Ffprobe,
    /// Use the linked FFmpeg libraries (requires the `ffmpeg` feature)
    Ffmpeg,
}

/// Options for probing a video.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Backend to use.
    pub backend: VideoBackend,
    /// Path or name of the ffprobe executable.
    pub ffprobe_path: String,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            backend: VideoBackend::Auto,
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

impl From<&crate::config::VideoConfig> for ProbeOptions {
    fn from(config: &crate::config::VideoConfig) -> Self {
        Self {
            backend: config.backend,
            ffprobe_path: config.ffprobe_path.clone(),
        }
    }
}

/// A frame count and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCount {
    pub frames: usize,
    pub source: FrameSource,
}

/// Determine the number of frames to allocate for `video`.
///
/// `override_frames` wins over probing. The video must exist either way.
pub fn resolve_frame_count(
    video: &Path,
    override_frames: Option<usize>,
    options: &ProbeOptions,
) -> Result<FrameCount> {
    if !video.exists() {
        anyhow::bail!("Video file does not exist: {}", video.display());
    }

    if let Some(frames) = override_frames {
        info!("Using frame count override: {}", frames);
        return Ok(FrameCount {
            frames,
            source: FrameSource::Override,
        });
    }

    probe_frame_count(video, options)
}

/// Read the frame count from the video container.
pub fn probe_frame_count(video: &Path, options: &ProbeOptions) -> Result<FrameCount> {
    debug!(
        "Probing {} with backend {:?}",
        video.display(),
        options.backend
    );

    let count = match effective_backend(options.backend)? {
        VideoBackend::Ffprobe => FrameCount {
            frames: ffprobe::probe(video, &options.ffprobe_path)?,
            source: FrameSource::Ffprobe,
        },
        #[cfg(feature = "ffmpeg")]
        VideoBackend::Ffmpeg => FrameCount {
            frames: ffmpeg::probe(video)?,
            source: FrameSource::Ffmpeg,
        },
        other => return Err(anyhow!("Unsupported video backend: {:?}", other)),
    };

    info!(
        "Video {} has {} frames ({})",
        video.display(),
        count.frames,
        count.source
    );

    Ok(count)
}

/// Resolve `Auto` and reject backends that were not compiled in.
fn effective_backend(backend: VideoBackend) -> Result<VideoBackend> {
    match backend {
        VideoBackend::Auto if cfg!(feature = "ffmpeg") => Ok(VideoBackend::Ffmpeg),
        VideoBackend::Auto => Ok(VideoBackend::Ffprobe),
        VideoBackend::Ffmpeg if !cfg!(feature = "ffmpeg") => Err(anyhow!(
            "The ffmpeg backend requires building with `--features ffmpeg`; use --backend ffprobe or --frames"
        )),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_override_skips_probing() {
        let video = NamedTempFile::new().unwrap();
        let options = ProbeOptions {
            backend: VideoBackend::Ffprobe,
            ffprobe_path: "/nonexistent/ffprobe".to_string(),
        };

        let count = resolve_frame_count(video.path(), Some(120), &options).unwrap();
        assert_eq!(count.frames, 120);
        assert_eq!(count.source, FrameSource::Override);
    }

    #[test]
    fn test_missing_video_is_an_error() {
        let result = resolve_frame_count(
            Path::new("/nonexistent/clip.mp4"),
            Some(10),
            &ProbeOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_ffprobe_is_an_error() {
        let video = NamedTempFile::new().unwrap();
        let options = ProbeOptions {
            backend: VideoBackend::Ffprobe,
            ffprobe_path: "/nonexistent/ffprobe".to_string(),
        };
        assert!(resolve_frame_count(video.path(), None, &options).is_err());
    }

    #[test]
    fn test_effective_backend() {
        assert_eq!(
            effective_backend(VideoBackend::Ffprobe).unwrap(),
            VideoBackend::Ffprobe
        );

        #[cfg(not(feature = "ffmpeg"))]
        {
            assert_eq!(
                effective_backend(VideoBackend::Auto).unwrap(),
                VideoBackend::Ffprobe
            );
            assert!(effective_backend(VideoBackend::Ffmpeg).is_err());
        }

        #[cfg(feature = "ffmpeg")]
        assert_eq!(
            effective_backend(VideoBackend::Auto).unwrap(),
            VideoBackend::Ffmpeg
        );
    }
}
