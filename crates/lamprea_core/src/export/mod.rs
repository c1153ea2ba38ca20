//! JSON export of directory lists.
//!
//! # Responsibility
//! - Snapshot one record list and write it as an indented JSON array.
//!
//! # Invariants
//! - Output is deterministic for unchanged data: rows by id, keys in
//!   declaration order, 2-space indentation, trailing newline.
//! - Files are only written inside the configured export directory.

pub mod json;

pub use json::{ExportError, ExportKind, ExportResult, Exporter};
