//! Frame counting through the linked FFmpeg libraries.

use anyhow::{anyhow, Context, Result};
use ffmpeg_next as ffmpeg;
use std::path::Path;
use tracing::debug;

/// Read the frame count of the best video stream.
///
/// Falls back to `duration * average frame rate` when the container does
/// not record a frame count.
pub(crate) fn probe(video: &Path) -> Result<usize> {
    ffmpeg::init().context("initialize ffmpeg")?;

    let input = ffmpeg::format::input(&video)
        .with_context(|| format!("failed to open '{}' with ffmpeg", video.display()))?;
    let stream = input
        .streams()
        .best(ffmpeg::media::Type::Video)
        .ok_or_else(|| anyhow!("{} has no video track", video.display()))?;

    let declared = stream.frames();
    if declared > 0 {
        return Ok(declared as usize);
    }

    let rate = f64::from(stream.avg_frame_rate());
    let seconds = stream.duration() as f64 * f64::from(stream.time_base());
    debug!(
        "No declared frame count, estimating from {:.3}s at {:.3} fps",
        seconds, rate
    );

    if rate > 0.0 && seconds > 0.0 {
        Ok((seconds * rate).round() as usize)
    } else {
        Err(anyhow!(
            "cannot determine frame count of {}",
            video.display()
        ))
    }
}
