//! The storage engine: one repository contract, two backends.
//!
//! [`traits`] defines the async repository traits; [`MemoryStore`] keeps
//! everything in process memory behind a single `RwLock`, [`SqliteStore`]
//! persists through a `sqlx::SqlitePool`. [`Storage`] wraps whichever one
//! was selected at startup so callers never see the concrete backend.
//!
//! Absence is always signaled as `Ok(None)`, never as an error; the
//! [`StoreError`] variants cover uniqueness conflicts and hard backend
//! failures only.

pub mod memory;
pub mod sqlite;
mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod contract_tests;

pub use memory::MemoryStore;
pub use sqlite::{Database, SqliteStore};
pub use storage::Storage;

use chrono::{DateTime, NaiveDate, Utc};

/// Errors from the storage engine. "Not found" is not represented here —
/// lookups and updates signal absence as `Ok(None)` so the boundary layer
/// can branch on it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated at creation time (duplicate
    /// username or external identity key).
    #[error("conflict: {0} already exists")]
    Conflict(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(String),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Generate a fresh opaque record identifier. Never reused; safe to call
/// concurrently.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current instant, used for all server-assigned timestamps.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current calendar day, the granularity of activity tracking.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Clamp an enrollment progress value to [0, 100]. Out-of-range input is
/// clamped, never rejected.
pub(crate) fn clamp_progress(progress: i64) -> i64 {
    progress.clamp(0, 100)
}

/// Answer comparison for brain teasers: whitespace-trimmed,
/// ASCII-case-insensitive exact match.
pub(crate) fn teaser_answer_matches(solution: &str, answer: &str) -> bool {
    solution.trim().eq_ignore_ascii_case(answer.trim())
}
