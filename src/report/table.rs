//! Descriptor table serialization.
//!
//! The on-disk format is one comma-separated row of plain integers per
//! frame, in frame order, each row terminated by `\n`. No header row.

use crate::models::DescriptorTable;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Write the table in descriptor format.
pub fn write_table<W: Write>(table: &DescriptorTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for row in table.rows() {
        csv_writer
            .write_record(row.iter().map(|count| count.to_string()))
            .context("Failed to write descriptor row")?;
    }

    csv_writer.flush().context("Failed to flush descriptor table")?;
    Ok(())
}

/// Render the table to a string.
#[allow(dead_code)] // Convenience for callers that want the text in memory
pub fn render_table(table: &DescriptorTable) -> Result<String> {
    let mut buffer = Vec::new();
    write_table(table, &mut buffer)?;
    String::from_utf8(buffer).context("Descriptor table is not valid UTF-8")
}

/// Write the table to a file, replacing any existing file.
pub fn save_table(table: &DescriptorTable, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_table(table, BufWriter::new(file))
        .with_context(|| format!("Failed to write descriptor table to {}", path.display()))
}

/// Parse a table in descriptor format; every row must have `class_count` columns.
pub fn read_table<R: Read>(reader: R, class_count: usize) -> Result<DescriptorTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read row {}", index))?;
        let row = record
            .iter()
            .map(|field| {
                field
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("Row {}: invalid count '{}'", index, field))
            })
            .collect::<Result<Vec<u32>>>()?;
        rows.push(row);
    }

    Ok(DescriptorTable::from_rows(rows, class_count)?)
}

/// Read a descriptor table back from a file.
pub fn load_table(path: &Path, class_count: usize) -> Result<DescriptorTable> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_table(file, class_count)
        .with_context(|| format!("Failed to parse descriptor table {}", path.display()))
}
