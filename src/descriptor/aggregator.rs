//! Detection aggregation into descriptor tables.
//!
//! This module walks a detection log group by group and counts every
//! detection into its `(frame, class)` cell.

use crate::descriptor::parser::parse_group;
use crate::error::DescriptorError;
use crate::models::{DescriptorTable, FrameGroup};
use indicatif::ProgressBar;
use tracing::{debug, trace};

/// Aggregate a detection log into a `total_frames x class_count` table.
///
/// Every frame row exists in the result, including frames the log never
/// mentions. Frame and class indices are checked against the table shape.
pub fn aggregate<S: AsRef<str>>(
    lines: &[S],
    total_frames: usize,
    class_count: usize,
) -> Result<DescriptorTable, DescriptorError> {
    aggregate_with_progress(lines, total_frames, class_count, &ProgressBar::hidden())
}

/// Same as [`aggregate`], advancing `progress` by one per consumed line.
pub fn aggregate_with_progress<S: AsRef<str>>(
    lines: &[S],
    total_frames: usize,
    class_count: usize,
    progress: &ProgressBar,
) -> Result<DescriptorTable, DescriptorError> {
    let mut table = DescriptorTable::new(total_frames, class_count)?;
    let mut cursor = 0;
    let mut groups = 0usize;

    progress.set_length(lines.len() as u64);

    while cursor < lines.len() {
        let group = parse_group(lines, cursor)?;
        let consumed = 1 + group.detections.len();

        accumulate(&mut table, &group)?;

        cursor += consumed;
        groups += 1;
        progress.inc(consumed as u64);
    }

    debug!(
        "Aggregated {} frame groups ({} lines) into {}x{} table",
        groups,
        lines.len(),
        total_frames,
        class_count
    );

    Ok(table)
}

/// Count one frame group into the table.
pub fn accumulate(table: &mut DescriptorTable, group: &FrameGroup) -> Result<(), DescriptorError> {
    let frame = checked_frame(group, table.frames())?;

    for detection in &group.detections {
        let class = usize::try_from(detection.class_index)
            .ok()
            .filter(|&c| c < table.classes())
            .ok_or(DescriptorError::ClassOutOfRange {
                line: detection.line,
                class: detection.class_index,
                class_count: table.classes(),
            })?;

        table.increment(frame, class);
    }

    trace!(
        "Frame {}: {} detections",
        frame,
        group.detections.len()
    );

    Ok(())
}

fn checked_frame(group: &FrameGroup, total_frames: usize) -> Result<usize, DescriptorError> {
    usize::try_from(group.frame_index)
        .ok()
        .filter(|&f| f < total_frames)
        .ok_or(DescriptorError::FrameOutOfRange {
            line: group.line,
            frame: group.frame_index,
            total_frames,
        })
}
