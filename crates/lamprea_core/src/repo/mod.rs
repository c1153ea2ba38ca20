//! Repository layer: one generic table implementation, one contract.
//!
//! # Responsibility
//! - Define the data-access contract every directory record satisfies.
//! - Keep SQL text and row mapping inside the persistence boundary.
//!
//! # Invariants
//! - Each repository reads and writes exactly one table.
//! - Table functions in [`table`] run on any connection, including a
//!   transaction owned by a composite operation.

pub mod entity_repo;
mod mapping;
pub mod table;
