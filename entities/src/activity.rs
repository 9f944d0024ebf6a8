use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-user, per-calendar-day accumulator of engagement minutes and solved
/// question counts. Exactly one record exists per (user_id, day); both
/// counters only ever grow, via additive upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivity {
    pub id: String,
    pub user_id: String,
    pub day: NaiveDate,
    pub minutes_active: i64,
    pub questions_solved: i64,
}
