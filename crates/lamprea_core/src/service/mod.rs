//! Core use-case services.
//!
//! # Responsibility
//! - Give front ends use-case level entry points over the repositories.
//! - Own the transaction boundary of every multi-table operation.

pub mod client_service;
pub mod entity_service;
