//! Descriptor summary reports.
//!
//! This module renders a [`DescriptorSummary`] as Markdown or JSON so a run
//! can be inspected without loading the full descriptor table.

use crate::cli::SummaryFormat;
use crate::models::{DescriptorSummary, SummaryMetadata};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown summary.
pub fn generate_markdown_summary(summary: &DescriptorSummary) -> String {
    let mut output = String::new();

    output.push_str("# YOLO Descriptor Summary\n\n");
    output.push_str(&generate_metadata_section(&summary.metadata));
    output.push_str(&generate_totals_section(summary));
    output.push_str(&generate_classes_section(summary));

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &SummaryMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Video:** `{}`\n", metadata.video_path));
    section.push_str(&format!(
        "- **Detections:** `{}`\n",
        metadata.detections_path
    ));
    section.push_str(&format!("- **Descriptor:** `{}`\n", metadata.output_path));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Frames:** {} (from {})\n",
        metadata.total_frames, metadata.frame_source
    ));
    section.push_str(&format!("- **Classes:** {}\n\n", metadata.class_count));

    section
}

/// Generate the totals section.
fn generate_totals_section(summary: &DescriptorSummary) -> String {
    let mut section = String::new();

    section.push_str("## Totals\n\n");
    section.push_str("| Detections | Frames with detections | Busiest frame |\n");
    section.push_str("|:---:|:---:|:---:|\n");

    let busiest = match summary.busiest_frame {
        Some(b) => format!("{} ({} detections)", b.frame, b.detections),
        None => "-".to_string(),
    };

    section.push_str(&format!(
        "| **{}** | {} / {} | {} |\n\n",
        summary.total_detections,
        summary.frames_with_detections,
        summary.metadata.total_frames,
        busiest
    ));

    section
}

/// Generate the per-class table.
fn generate_classes_section(summary: &DescriptorSummary) -> String {
    let mut section = String::new();

    section.push_str("## Detections by Class\n\n");

    if summary.classes.is_empty() {
        section.push_str("No detections were recorded.\n");
        return section;
    }

    section.push_str("| Id | Class | Detections | Frames |\n");
    section.push_str("|:---:|:---|:---:|:---:|\n");

    for class in &summary.classes {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            class.class_id, class.name, class.detections, class.frames_present
        ));
    }

    section
}

/// Generate a JSON summary.
pub fn generate_json_summary(summary: &DescriptorSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Render and write the summary in the requested format.
pub fn write_summary(summary: &DescriptorSummary, path: &Path, format: SummaryFormat) -> Result<()> {
    let content = match format {
        SummaryFormat::Markdown => generate_markdown_summary(summary),
        SummaryFormat::Json => generate_json_summary(summary)?,
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write summary to {}", path.display()))
}
