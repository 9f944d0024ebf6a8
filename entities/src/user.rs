use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role. The reserved `admin` username is created with `Admin` by
/// the bootstrap seeding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// A registered user.
///
/// `password` is an opaque hashed credential string; the storage core never
/// hashes or verifies credentials. `external_key` links an external identity
/// (e.g. an OAuth subject) and is unique when present, independently of the
/// username uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub streak: i64,
    pub last_daily_solve: Option<DateTime<Utc>>,
    pub external_key: Option<String>,
}

/// Input for creating a user. `role` defaults to `Role::User`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub external_key: Option<String>,
}
