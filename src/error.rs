//! Error types for descriptor aggregation.
//!
//! Application plumbing (file I/O, probing, config) uses `anyhow`; the
//! aggregation core reports its failures through [`DescriptorError`] so
//! callers and tests can match on the exact condition.

use thiserror::Error;

/// Errors raised while turning a detection log into a descriptor table.
///
/// Line numbers are 1-based and refer to the position in the detection log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// A header or record line could not be parsed.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A frame group announced more records than the log contains.
    #[error("line {line}: frame group expects {expected} records but only {available} remain")]
    TruncatedGroup {
        line: usize,
        expected: usize,
        available: usize,
    },

    /// A header referenced a frame outside `[0, total_frames)`.
    #[error("line {line}: frame index {frame} out of range (video has {total_frames} frames)")]
    FrameOutOfRange {
        line: usize,
        frame: i64,
        total_frames: usize,
    },

    /// A record referenced a class outside `[0, class_count)`.
    #[error("line {line}: class index {class} out of range (class count is {class_count})")]
    ClassOutOfRange {
        line: usize,
        class: i64,
        class_count: usize,
    },

    /// The table could not be built with the requested shape.
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Errors raised while building a descriptor table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// `frames x classes` cells do not fit in memory.
    #[error("descriptor table of {frames} frames x {classes} classes is too large to allocate")]
    TooLarge { frames: usize, classes: usize },

    /// A row does not have one cell per class.
    #[error("row {row} has {columns} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        columns: usize,
        expected: usize,
    },
}

impl DescriptorError {
    /// Builds a parse error for the given line.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        DescriptorError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Returns the log line the error points at, if it came from one.
    #[allow(dead_code)] // Used by tests and library-style callers
    pub fn line(&self) -> Option<usize> {
        match self {
            DescriptorError::Parse { line, .. }
            | DescriptorError::TruncatedGroup { line, .. }
            | DescriptorError::FrameOutOfRange { line, .. }
            | DescriptorError::ClassOutOfRange { line, .. } => Some(*line),
            DescriptorError::Table(_) => None,
        }
    }

    /// True for the out-of-range family of errors.
    #[allow(dead_code)] // Used by tests and library-style callers
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            DescriptorError::FrameOutOfRange { .. } | DescriptorError::ClassOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_include_line() {
        let err = DescriptorError::parse(7, "invalid object count 'x'");
        assert_eq!(err.to_string(), "line 7: invalid object count 'x'");
        assert_eq!(err.line(), Some(7));

        let err = DescriptorError::FrameOutOfRange {
            line: 3,
            frame: 12,
            total_frames: 10,
        };
        assert!(err.to_string().contains("frame index 12"));
        assert!(err.is_out_of_range());
    }

    #[test]
    fn test_truncated_group_is_not_out_of_range() {
        let err = DescriptorError::TruncatedGroup {
            line: 1,
            expected: 4,
            available: 2,
        };
        assert!(!err.is_out_of_range());
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_table_errors_have_no_line() {
        let err = DescriptorError::from(TableError::TooLarge {
            frames: usize::MAX,
            classes: 80,
        });
        assert_eq!(err.line(), None);
        assert!(!err.is_out_of_range());
        assert!(err.to_string().contains("too large to allocate"));
    }
}
