//! Storage core for the codearena backend.
//!
//! The HTTP route layer, session middleware and external contest feeds live
//! elsewhere; they call into this crate through the repository traits in
//! [`persistence::traits`] and the backend-agnostic [`persistence::Storage`]
//! handle.

pub mod config;
pub mod persistence;
pub mod seed;
pub mod stats;

pub use persistence::traits::{
    ActivityRepository, ChallengeRepository, ContestRepository, CourseRepository, Store,
    UserRepository,
};
pub use persistence::{MemoryStore, SqliteStore, Storage, StoreError};
