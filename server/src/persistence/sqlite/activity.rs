//! SQLite-backed daily activity accumulator.

use chrono::NaiveDate;
use entities::UserActivity;

use super::SqliteStore;
use crate::persistence::traits::ActivityRepository;
use crate::persistence::{new_id, today, StoreError};

type ActivityRow = (String, String, NaiveDate, i64, i64);

fn activity_from_row(row: ActivityRow) -> UserActivity {
    let (id, user_id, day, minutes_active, questions_solved) = row;
    UserActivity {
        id,
        user_id,
        day,
        minutes_active,
        questions_solved,
    }
}

const ACTIVITY_COLUMNS: &str = "id, user_id, day, minutes_active, questions_solved";

impl ActivityRepository for SqliteStore {
    async fn track_activity(
        &self,
        user_id: &str,
        minutes_delta: i64,
        questions_delta: i64,
    ) -> Result<UserActivity, StoreError> {
        let day = today();

        // Additive upsert on the UNIQUE(user_id, day) index: concurrent
        // deltas for the same day all accumulate instead of overwriting.
        let row: ActivityRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO user_activity (id, user_id, day, minutes_active, questions_solved)
            VALUES (?, ?, ?, MAX(?, 0), MAX(?, 0))
            ON CONFLICT (user_id, day) DO UPDATE SET
                minutes_active = minutes_active + excluded.minutes_active,
                questions_solved = questions_solved + excluded.questions_solved
            RETURNING {ACTIVITY_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(user_id)
        .bind(day)
        .bind(minutes_delta)
        .bind(questions_delta)
        .fetch_one(self.pool())
        .await?;

        Ok(activity_from_row(row))
    }

    async fn get_activity(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Option<UserActivity>, StoreError> {
        let row: Option<ActivityRow> = sqlx::query_as(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM user_activity WHERE user_id = ? AND day = ?"
        ))
        .bind(user_id)
        .bind(day)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(activity_from_row))
    }

    async fn list_activity(&self, user_id: &str) -> Result<Vec<UserActivity>, StoreError> {
        let rows: Vec<ActivityRow> = sqlx::query_as(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM user_activity WHERE user_id = ? ORDER BY day DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(activity_from_row).collect())
    }
}
