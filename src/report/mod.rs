//! Output generation.
//!
//! `table` writes the descriptor table itself; `summary` renders the
//! optional human-readable report alongside it.

pub mod summary;
pub mod table;

pub use summary::write_summary;
pub use table::{load_table, save_table};
