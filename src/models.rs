//! Data models for descriptor generation.
//!
//! This module contains the core data structures used throughout the
//! application: parsed detection-log structures, the descriptor table
//! itself, and the per-class summary built from it.

use crate::error::TableError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of classes in the COCO-trained YOLO detectors.
pub const DEFAULT_CLASS_COUNT: usize = 80;

/// COCO class labels in YOLO class-id order.
pub const COCO_CLASS_NAMES: [&str; DEFAULT_CLASS_COUNT] = [
    "person", "bicycle", "car", "motorbike", "aeroplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "sofa", "pottedplant",
    "bed", "diningtable", "toilet", "tvmonitor", "laptop", "mouse", "remote", "keyboard",
    "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase",
    "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Header line of a frame group: how many records follow and which frame they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Number of detection records immediately following the header.
    pub object_count: usize,
    /// Frame the records belong to. Not yet checked against the video length.
    pub frame_index: i64,
}

/// A single detection record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// 1-based line number in the detection log.
    pub line: usize,
    /// Class identifier. Not yet checked against the class domain.
    pub class_index: i64,
}

/// A header plus the detection records that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameGroup {
    /// 1-based line number of the header.
    pub line: usize,
    /// Frame the detections belong to.
    pub frame_index: i64,
    /// Detections in log order.
    pub detections: Vec<Detection>,
}

/// Dense per-frame, per-class detection counts.
///
/// Stored row-major: row `f` holds the `classes` counts of frame `f`.
/// Only the aggregator can change cells; everyone else gets a read-only view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorTable {
    frames: usize,
    classes: usize,
    cells: Vec<u32>,
}

impl DescriptorTable {
    /// Creates an all-zero table.
    ///
    /// Fails instead of aborting when the shape does not fit in memory.
    pub fn new(frames: usize, classes: usize) -> Result<Self, TableError> {
        let too_large = TableError::TooLarge { frames, classes };
        let len = frames.checked_mul(classes).ok_or(too_large.clone())?;

        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| too_large)?;
        cells.resize(len, 0);

        Ok(Self {
            frames,
            classes,
            cells,
        })
    }

    /// Builds a table from explicit rows, each of which must hold `classes` cells.
    pub fn from_rows(rows: Vec<Vec<u32>>, classes: usize) -> Result<Self, TableError> {
        let frames = rows.len();
        let mut cells = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != classes {
                return Err(TableError::RaggedRow {
                    row: index,
                    columns: row.len(),
                    expected: classes,
                });
            }
            cells.extend(row);
        }

        Ok(Self {
            frames,
            classes,
            cells,
        })
    }

    /// Number of frame rows.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of class columns.
    pub fn classes(&self) -> usize {
        self.classes
    }

    /// Count for one cell, or `None` when out of bounds.
    #[allow(dead_code)] // Cell accessor for callers inspecting single counts
    pub fn get(&self, frame: usize, class: usize) -> Option<u32> {
        if frame < self.frames && class < self.classes {
            Some(self.cells[frame * self.classes + class])
        } else {
            None
        }
    }

    /// One frame's row.
    pub fn row(&self, frame: usize) -> Option<&[u32]> {
        if frame < self.frames {
            let start = frame * self.classes;
            Some(&self.cells[start..start + self.classes])
        } else {
            None
        }
    }

    /// Iterates rows in frame order.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        (0..self.frames).filter_map(move |frame| self.row(frame))
    }

    /// Sum of every cell.
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&c| u64::from(c)).sum()
    }

    /// Detections per class over the whole video.
    pub fn class_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.classes];
        for row in self.rows() {
            for (total, &count) in totals.iter_mut().zip(row) {
                *total += u64::from(count);
            }
        }
        totals
    }

    /// Number of frames in which each class appears at least once.
    pub fn class_frame_presence(&self) -> Vec<usize> {
        let mut presence = vec![0usize; self.classes];
        for row in self.rows() {
            for (seen, &count) in presence.iter_mut().zip(row) {
                if count > 0 {
                    *seen += 1;
                }
            }
        }
        presence
    }

    /// Number of frames with at least one detection.
    pub fn frames_with_detections(&self) -> usize {
        self.rows().filter(|row| row.iter().any(|&c| c > 0)).count()
    }

    /// Frame with the most detections (earliest wins ties), if any frame has one.
    pub fn busiest_frame(&self) -> Option<(usize, u64)> {
        let mut best: Option<(usize, u64)> = None;
        for (frame, row) in self.rows().enumerate() {
            let count: u64 = row.iter().map(|&c| u64::from(c)).sum();
            if count > 0 && best.map_or(true, |(_, b)| count > b) {
                best = Some((frame, count));
            }
        }
        best
    }

    /// Adds one detection. Callers must have checked the bounds.
    pub(crate) fn increment(&mut self, frame: usize, class: usize) {
        debug_assert!(frame < self.frames && class < self.classes);
        let cell = &mut self.cells[frame * self.classes + class];
        *cell = cell.saturating_add(1);
    }
}

/// How the frame count of the video was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameSource {
    /// Supplied on the command line.
    Override,
    /// Read by the `ffprobe` executable.
    Ffprobe,
    /// Read through the linked FFmpeg libraries.
    Ffmpeg,
}

impl fmt::Display for FrameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameSource::Override => write!(f, "override"),
            FrameSource::Ffprobe => write!(f, "ffprobe"),
            FrameSource::Ffmpeg => write!(f, "ffmpeg"),
        }
    }
}

/// Detection statistics for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
    /// YOLO class id.
    pub class_id: usize,
    /// Human-readable label.
    pub name: String,
    /// Total detections across all frames.
    pub detections: u64,
    /// Frames containing at least one detection of this class.
    pub frames_present: usize,
}

/// The frame with the most detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusiestFrame {
    pub frame: usize,
    pub detections: u64,
}

/// Metadata about a descriptor run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetadata {
    /// Video the frame count came from.
    pub video_path: String,
    /// Detection log that was aggregated.
    pub detections_path: String,
    /// Where the descriptor table was written.
    pub output_path: String,
    /// When the summary was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of frame rows.
    pub total_frames: usize,
    /// Number of class columns.
    pub class_count: usize,
    /// How the frame count was obtained.
    pub frame_source: FrameSource,
}

/// Summary of a descriptor table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorSummary {
    pub metadata: SummaryMetadata,
    /// Sum over the whole table.
    pub total_detections: u64,
    /// Frames with at least one detection.
    pub frames_with_detections: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busiest_frame: Option<BusiestFrame>,
    /// Classes that were detected at least once, most frequent first.
    pub classes: Vec<ClassSummary>,
}

impl DescriptorSummary {
    /// Creates a summary from a finished table.
    ///
    /// Classes without a name in `class_names` are labelled `class_<id>`.
    pub fn from_table(
        table: &DescriptorTable,
        metadata: SummaryMetadata,
        class_names: &[String],
    ) -> Self {
        let presence = table.class_frame_presence();

        let mut classes: Vec<ClassSummary> = table
            .class_totals()
            .into_iter()
            .enumerate()
            .filter(|(_, detections)| *detections > 0)
            .map(|(class_id, detections)| ClassSummary {
                class_id,
                name: class_name(class_names, class_id),
                detections,
                frames_present: presence[class_id],
            })
            .collect();

        classes.sort_by(|a, b| {
            b.detections
                .cmp(&a.detections)
                .then(a.class_id.cmp(&b.class_id))
        });

        Self {
            metadata,
            total_detections: table.total(),
            frames_with_detections: table.frames_with_detections(),
            busiest_frame: table
                .busiest_frame()
                .map(|(frame, detections)| BusiestFrame { frame, detections }),
            classes,
        }
    }
}

/// Label for a class id.
pub fn class_name(class_names: &[String], class_id: usize) -> String {
    class_names
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("class_{}", class_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> DescriptorTable {
        let mut table = DescriptorTable::new(4, 3).unwrap();
        table.increment(0, 1);
        table.increment(0, 1);
        table.increment(2, 0);
        table.increment(2, 1);
        table.increment(2, 1);
        table
    }

    fn sample_metadata() -> SummaryMetadata {
        SummaryMetadata {
            video_path: "clip.mp4".to_string(),
            detections_path: "clip.yolo".to_string(),
            output_path: "clip.csv".to_string(),
            generated_at: Utc::now(),
            total_frames: 4,
            class_count: 3,
            frame_source: FrameSource::Override,
        }
    }

    #[test]
    fn test_new_table_is_zeroed() {
        let table = DescriptorTable::new(5, DEFAULT_CLASS_COUNT).unwrap();
        assert_eq!(table.frames(), 5);
        assert_eq!(table.classes(), 80);
        assert_eq!(table.total(), 0);
        assert!(table.rows().all(|row| row.len() == 80 && row.iter().all(|&c| c == 0)));
    }

    #[test]
    fn test_get_and_row_bounds() {
        let table = sample_table();
        assert_eq!(table.get(0, 1), Some(2));
        assert_eq!(table.get(4, 0), None);
        assert_eq!(table.get(0, 3), None);
        assert_eq!(table.row(1), Some(&[0, 0, 0][..]));
        assert!(table.row(4).is_none());
    }

    #[test]
    fn test_statistics() {
        let table = sample_table();
        assert_eq!(table.total(), 5);
        assert_eq!(table.class_totals(), vec![1, 4, 0]);
        assert_eq!(table.class_frame_presence(), vec![1, 2, 0]);
        assert_eq!(table.frames_with_detections(), 2);
        assert_eq!(table.busiest_frame(), Some((2, 3)));
    }

    #[test]
    fn test_busiest_frame_empty_table() {
        assert_eq!(DescriptorTable::new(3, 2).unwrap().busiest_frame(), None);
        assert_eq!(DescriptorTable::new(0, 80).unwrap().busiest_frame(), None);
    }

    #[test]
    fn test_from_rows_checks_width() {
        let table = DescriptorTable::from_rows(vec![vec![1, 0], vec![0, 2]], 2).unwrap();
        assert_eq!(table.get(1, 1), Some(2));
        assert_eq!(
            DescriptorTable::from_rows(vec![vec![1, 0, 0]], 2),
            Err(TableError::RaggedRow {
                row: 0,
                columns: 3,
                expected: 2,
            })
        );
    }

    #[test]
    fn test_new_rejects_shapes_that_overflow() {
        // frames * classes wraps around usize
        assert_eq!(
            DescriptorTable::new(usize::MAX / 40, 80),
            Err(TableError::TooLarge {
                frames: usize::MAX / 40,
                classes: 80,
            })
        );

        // The cell count fits in usize but the byte size does not
        assert!(matches!(
            DescriptorTable::new(usize::MAX / 80, 80),
            Err(TableError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_coco_names() {
        assert_eq!(COCO_CLASS_NAMES.len(), DEFAULT_CLASS_COUNT);
        assert_eq!(COCO_CLASS_NAMES[0], "person");
        assert_eq!(COCO_CLASS_NAMES[79], "toothbrush");
    }

    #[test]
    fn test_summary_from_table() {
        let names: Vec<String> = vec!["person".to_string(), "bicycle".to_string()];
        let summary = DescriptorSummary::from_table(&sample_table(), sample_metadata(), &names);

        assert_eq!(summary.total_detections, 5);
        assert_eq!(summary.frames_with_detections, 2);
        assert_eq!(
            summary.busiest_frame,
            Some(BusiestFrame {
                frame: 2,
                detections: 3
            })
        );
        assert_eq!(summary.classes.len(), 2);
        assert_eq!(summary.classes[0].name, "bicycle");
        assert_eq!(summary.classes[0].detections, 4);
        assert_eq!(summary.classes[1].name, "person");
    }

    #[test]
    fn test_class_name_fallback() {
        let names = vec!["person".to_string()];
        assert_eq!(class_name(&names, 0), "person");
        assert_eq!(class_name(&names, 42), "class_42");
    }
}
