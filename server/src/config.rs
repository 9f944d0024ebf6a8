//! Configuration for the codearena storage core.
//!
//! Handles data directory and backend selection with the following
//! precedence:
//! 1. CODEARENA_DATA_DIR environment variable
//! 2. ~/.config/codearena/data (production default)
//! 3. ./data (fallback for development)

use std::path::PathBuf;

const DEFAULT_CONFIG_DIR: &str = ".config/codearena/data";
const DEV_DATA_DIR: &str = "./data";
const DATABASE_FILE: &str = "codearena.db";

/// Which storage backend to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite,
    Memory,
}

/// Get the data directory for persistence.
///
/// Priority:
/// 1. CODEARENA_DATA_DIR env variable if set
/// 2. $HOME/.config/codearena/data if HOME is set
/// 3. ./data as fallback
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CODEARENA_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(DEFAULT_CONFIG_DIR);
    }

    PathBuf::from(DEV_DATA_DIR)
}

/// Path of the sqlite database file inside the data directory.
pub fn get_database_path() -> PathBuf {
    get_data_dir().join(DATABASE_FILE)
}

/// Backend selection from CODEARENA_BACKEND ("sqlite" or "memory").
/// Defaults to sqlite; unknown values fall back to sqlite as well, the
/// startup fallback in [`crate::persistence::Storage::init`] still applies.
pub fn get_backend_kind() -> BackendKind {
    match std::env::var("CODEARENA_BACKEND").as_deref() {
        Ok("memory") => BackendKind::Memory,
        _ => BackendKind::Sqlite,
    }
}
