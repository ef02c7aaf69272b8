//! Document model shared by every roster collection.
//!
//! # Responsibility
//! - Define the free-form `Record` stored in each collection.
//! - Name the collections so one code path serves all resources.
//!
//! # Invariants
//! - Every stored record is identified by a stable `RecordId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod collection;
pub mod record;
