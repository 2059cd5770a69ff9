//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the snapshot contract the tree store persists through.
//! - Isolate file layout and codec details from store orchestration.
//!
//! # Invariants
//! - Repositories persist whole forests; the store never writes partial
//!   trees.
//! - Repository APIs surface decode failures as errors; recovery policy
//!   belongs to the caller.

pub mod forest_repo;
