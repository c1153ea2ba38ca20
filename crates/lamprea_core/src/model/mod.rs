//! Directory records for the back office: clients, agents and drivers.
//!
//! # Invariants
//! - Every record is identified by a caller-assigned [`EntityId`].
//! - Records own no child collections; relationships are read through
//!   repositories and returned as owned snapshots.

pub mod agent;
pub mod client;
pub mod driver;

/// Caller-assigned integer identifier shared by every directory record.
pub type EntityId = i64;
