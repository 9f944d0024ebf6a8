//! SQLite-backed storage implementation.
//!
//! ## Database setup
//!
//! [`Database`] wraps a `sqlx::SqlitePool` configured with:
//! - **WAL mode** — one writer, multiple concurrent readers.
//! - **Foreign keys enabled** — enforced at the connection level for the
//!   tables that declare them (enrollments, lesson progress, marathon
//!   participants); a violated parent reference is reported to callers as
//!   ordinary absence.
//! - **Embedded migrations** — `sqlx::migrate!` runs
//!   `migrations/001_initial_schema.sql` when [`Database::open`] is called.
//!   The schema is idempotent.
//!
//! ## Store type
//!
//! [`SqliteStore`] holds the pool and implements every repository trait
//! from [`crate::persistence::traits`]. Enum columns are stored as `TEXT`
//! matching the schema CHECK constraints and round-tripped through the
//! codecs in [`helpers`]; list-valued fields (topics, hints, quiz data)
//! are stored as JSON `TEXT`.
//!
//! The compound operations lean on the schema's unique constraints:
//! `track_activity` and `update_lesson_progress` are single
//! `ON CONFLICT DO UPDATE` statements, `enroll` is a transaction around an
//! `INSERT OR IGNORE` plus the student-counter increment.

mod activity;
mod challenges;
mod contests;
mod courses;
mod database;
pub(crate) mod helpers;
mod users;

pub use database::Database;

use sqlx::SqlitePool;

/// SQLite implementation of the storage contract.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
