//! Travel-journal domain model.
//!
//! # Responsibility
//! - Define the value types stored in the folder forest.
//! - Keep identity (`SpotId`/`FolderId`) separate from mutable content.
//!
//! # Invariants
//! - Every spot and folder is identified by a UUID that is never reassigned.
//! - Ids are unique across the whole forest, not only among siblings.
//! - A folder is exclusively owned by one parent (forest, not DAG).

pub mod coordinate;
pub mod folder;
pub mod spot;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as Unix epoch milliseconds.
///
/// Falls back to `0` if the system clock is before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
