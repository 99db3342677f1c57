//! Detection-log parsing.
//!
//! A detection log is a flat sequence of frame groups. Each group starts
//! with a header line `objectCount,frameIndex` and is followed by exactly
//! `objectCount` record lines whose first field is the class id:
//!
//! ```text
//! 2,0
//! 5,0.81,120,44,32,60
//! 7,0.64,300,90,28,41
//! 0,1
//! 1,2
//! 3,0.77,12,30,80,80
//! ```

use crate::error::DescriptorError;
use crate::models::{Detection, FrameGroup, FrameHeader};

/// Parse a header line into its object count and frame index.
///
/// Both fields are read as decimal numbers and truncated toward zero, so
/// `"3.0,17.9"` yields three objects on frame 17.
pub fn parse_header(line: &str, line_number: usize) -> Result<FrameHeader, DescriptorError> {
    let mut fields = line.split(',');

    let count_field = fields.next().unwrap_or("");
    let frame_field = fields.next().ok_or_else(|| {
        DescriptorError::parse(
            line_number,
            format!("header '{}' is missing the frame index", line.trim()),
        )
    })?;

    let object_count = truncate_number(count_field, line_number, "object count")?;
    if object_count < 0 {
        return Err(DescriptorError::parse(
            line_number,
            format!("negative object count {}", object_count),
        ));
    }

    let frame_index = truncate_number(frame_field, line_number, "frame index")?;

    Ok(FrameHeader {
        object_count: object_count as usize,
        frame_index,
    })
}

/// Parse a detection record, keeping only its class id.
pub fn parse_record(line: &str, line_number: usize) -> Result<Detection, DescriptorError> {
    let field = line.split(',').next().unwrap_or("").trim();

    let class_index = field.parse::<i64>().map_err(|_| {
        DescriptorError::parse(line_number, format!("invalid class id '{}'", field))
    })?;

    Ok(Detection {
        line: line_number,
        class_index,
    })
}

/// Split a detection log into frame groups, in document order.
#[allow(dead_code)] // The aggregator walks groups one at a time instead
pub fn parse_groups<S: AsRef<str>>(lines: &[S]) -> Result<Vec<FrameGroup>, DescriptorError> {
    let mut groups = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        let group = parse_group(lines, cursor)?;
        cursor += 1 + group.detections.len();
        groups.push(group);
    }

    Ok(groups)
}

/// Parse the frame group whose header sits at `cursor` (0-based).
pub(crate) fn parse_group<S: AsRef<str>>(
    lines: &[S],
    cursor: usize,
) -> Result<FrameGroup, DescriptorError> {
    let header_line = cursor + 1;
    let header = parse_header(lines[cursor].as_ref(), header_line)?;

    let available = lines.len() - cursor - 1;
    if header.object_count > available {
        return Err(DescriptorError::TruncatedGroup {
            line: header_line,
            expected: header.object_count,
            available,
        });
    }

    let detections = lines[cursor + 1..cursor + 1 + header.object_count]
        .iter()
        .enumerate()
        .map(|(offset, line)| parse_record(line.as_ref(), header_line + 1 + offset))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FrameGroup {
        line: header_line,
        frame_index: header.frame_index,
        detections,
    })
}

/// Read a decimal number and truncate it toward zero.
fn truncate_number(field: &str, line_number: usize, what: &str) -> Result<i64, DescriptorError> {
    let field = field.trim();

    let value = field.parse::<f64>().map_err(|_| {
        DescriptorError::parse(line_number, format!("invalid {} '{}'", what, field))
    })?;

    if !value.is_finite() {
        return Err(DescriptorError::parse(
            line_number,
            format!("{} '{}' is not a finite number", what, field),
        ));
    }

    Ok(value.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_integers() {
        let header = parse_header("2,0", 1).unwrap();
        assert_eq!(header.object_count, 2);
        assert_eq!(header.frame_index, 0);
    }

    #[test]
    fn test_parse_header_truncates_fractions() {
        let header = parse_header("3.0,17.9", 1).unwrap();
        assert_eq!(header.object_count, 3);
        assert_eq!(header.frame_index, 17);

        let header = parse_header(" 1.99 , 4.5\r", 1).unwrap();
        assert_eq!(header.object_count, 1);
        assert_eq!(header.frame_index, 4);
    }

    #[test]
    fn test_parse_header_extra_fields_ignored() {
        let header = parse_header("1,5,extra", 1).unwrap();
        assert_eq!(header.object_count, 1);
        assert_eq!(header.frame_index, 5);
    }

    #[test]
    fn test_parse_header_negative_frame_is_kept() {
        // Range checks belong to the aggregator.
        let header = parse_header("0,-1", 1).unwrap();
        assert_eq!(header.frame_index, -1);

        // Truncation toward zero, not flooring.
        let header = parse_header("0,-0.5", 1).unwrap();
        assert_eq!(header.frame_index, 0);
    }

    #[test]
    fn test_parse_header_errors() {
        assert!(matches!(
            parse_header("2", 4),
            Err(DescriptorError::Parse { line: 4, .. })
        ));
        assert!(parse_header("two,0", 1).is_err());
        assert!(parse_header("", 1).is_err());
        assert!(parse_header("1,inf", 1).is_err());
        assert!(parse_header("NaN,0", 1).is_err());
        assert!(parse_header("-1,0", 1).is_err());
    }

    #[test]
    fn test_parse_record() {
        let det = parse_record("5,0.81,120,44,32,60", 9).unwrap();
        assert_eq!(det.class_index, 5);
        assert_eq!(det.line, 9);

        assert_eq!(parse_record("12", 1).unwrap().class_index, 12);
        assert_eq!(parse_record(" 3 ,x", 1).unwrap().class_index, 3);
    }

    #[test]
    fn test_parse_record_rejects_non_integer() {
        assert!(parse_record("5.0,1,2", 1).is_err());
        assert!(parse_record("person,1,2", 1).is_err());
        assert!(parse_record("", 1).is_err());
    }

    #[test]
    fn test_parse_groups() {
        let lines = ["2,0", "5,0", "7,0", "1,2", "3,2"];
        let groups = parse_groups(&lines).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].line, 1);
        assert_eq!(groups[0].frame_index, 0);
        assert_eq!(
            groups[0]
                .detections
                .iter()
                .map(|d| d.class_index)
                .collect::<Vec<_>>(),
            vec![5, 7]
        );
        assert_eq!(groups[1].line, 4);
        assert_eq!(groups[1].frame_index, 2);
        assert_eq!(groups[1].detections[0].line, 5);
    }

    #[test]
    fn test_zero_count_group_consumes_only_header() {
        let lines = ["0,0", "1,1", "4,0"];
        let groups = parse_groups(&lines).unwrap();

        assert_eq!(groups.len(), 2);
        assert!(groups[0].detections.is_empty());
        assert_eq!(groups[1].line, 2);
        assert_eq!(groups[1].detections[0].class_index, 4);
    }

    #[test]
    fn test_truncated_group() {
        let lines = ["3,0", "1,0"];
        assert_eq!(
            parse_groups(&lines),
            Err(DescriptorError::TruncatedGroup {
                line: 1,
                expected: 3,
                available: 1,
            })
        );
    }

    #[test]
    fn test_bad_record_reports_its_line() {
        let lines = ["0,0", "2,1", "4,0", "oops"];
        let err = parse_groups(&lines).unwrap_err();
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn test_empty_log() {
        let lines: Vec<String> = Vec::new();
        assert!(parse_groups(&lines).unwrap().is_empty());
    }
}
