//! SQLite-backed user repository.
//!
//! Username and external-key uniqueness are enforced by the schema's
//! UNIQUE indexes rather than check-then-insert, so concurrent
//! registrations cannot race past the check; a violation is mapped to
//! [`StoreError::Conflict`].

use chrono::{DateTime, Utc};
use entities::{NewUser, Role, User};

use super::helpers::{decode_role, is_unique_violation};
use super::SqliteStore;
use crate::persistence::traits::UserRepository;
use crate::persistence::{new_id, StoreError};

type UserRow = (
    String,
    String,
    String,
    String,
    i64,
    Option<DateTime<Utc>>,
    Option<String>,
);

fn user_from_row(row: UserRow) -> User {
    let (id, username, password, role, streak, last_daily_solve, external_key) = row;
    User {
        id,
        username,
        password,
        role: decode_role(&role),
        streak,
        last_daily_solve,
        external_key,
    }
}

const USER_COLUMNS: &str = "id, username, password, role, streak, last_daily_solve, external_key";

impl SqliteStore {
    async fn fetch_user(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {column} = ?"
        ))
        .bind(value)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(user_from_row))
    }
}

impl UserRepository for SqliteStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = User {
            id: new_id(),
            username: new_user.username,
            password: new_user.password,
            role: new_user.role.unwrap_or(Role::User),
            streak: 0,
            last_daily_solve: None,
            external_key: new_user.external_key,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, password, role, streak, last_daily_solve, external_key)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.role.as_str())
        .bind(user.streak)
        .bind(user.last_daily_solve)
        .bind(&user.external_key)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e, "users.username") => {
                Err(StoreError::Conflict("username"))
            }
            Err(e) if is_unique_violation(&e, "users.external_key") => {
                Err(StoreError::Conflict("external identity key"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user("id", id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user("username", username).await
    }

    async fn get_user_by_external_key(&self, key: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user("external_key", key).await
    }

    async fn update_user_streak(
        &self,
        id: &str,
        streak: i64,
        last_daily_solve: Option<DateTime<Utc>>,
    ) -> Result<Option<User>, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET streak = MAX(?, 0),
                last_daily_solve = COALESCE(?, last_daily_solve)
            WHERE id = ?
            "#,
        )
        .bind(streak)
        .bind(last_daily_solve)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user(id).await
    }
}
