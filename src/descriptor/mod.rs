//! Descriptor generation from YOLO detection logs.
//!
//! The parser understands the frame-group layout of a detection log; the
//! aggregator folds parsed groups into a per-frame class-count table.

pub mod aggregator;
pub mod parser;

pub use aggregator::{aggregate, aggregate_with_progress};
