//! Frame counting through the `ffprobe` executable.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Read the frame count of the first video stream.
///
/// Uses the container's `nb_frames` when recorded, otherwise counts packets.
pub fn probe(video: &Path, ffprobe_path: &str) -> Result<usize> {
    let declared = run_ffprobe(
        ffprobe_path,
        &["-show_entries", "stream=nb_frames"],
        video,
    )?;

    if let Some(frames) = parse_count(&declared) {
        return Ok(frames);
    }

    warn!(
        "{} does not declare a frame count, counting packets",
        video.display()
    );

    let counted = run_ffprobe(
        ffprobe_path,
        &["-count_packets", "-show_entries", "stream=nb_read_packets"],
        video,
    )?;

    parse_count(&counted).with_context(|| {
        format!(
            "ffprobe returned no frame count for {}: {:?}",
            video.display(),
            counted.trim()
        )
    })
}

fn run_ffprobe(ffprobe_path: &str, entries: &[&str], video: &Path) -> Result<String> {
    debug!("Running {} {:?} on {}", ffprobe_path, entries, video.display());

    let output = Command::new(ffprobe_path)
        .args(["-v", "error", "-select_streams", "v:0"])
        .args(entries)
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(video)
        .output()
        .with_context(|| format!("Failed to run {}", ffprobe_path))?;

    if !output.status.success() {
        anyhow::bail!(
            "ffprobe failed on {} ({}): {}",
            video.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse ffprobe's value-only output; `N/A` and empty output yield `None`.
pub fn parse_count(output: &str) -> Option<usize> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<usize>().ok())
}
