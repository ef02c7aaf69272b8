//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the document store contract injected into services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every operation is scoped to exactly one `Collection`.
//! - Listing order is `title ASC, id ASC` in every implementation.
//! - Repository APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to DB transport errors.

pub mod memory_repo;
pub mod record_repo;
