use chrono::NaiveDate;
use entities::UserActivity;

use super::MemoryStore;
use crate::persistence::traits::ActivityRepository;
use crate::persistence::{new_id, today, StoreError};

impl ActivityRepository for MemoryStore {
    async fn track_activity(
        &self,
        user_id: &str,
        minutes_delta: i64,
        questions_delta: i64,
    ) -> Result<UserActivity, StoreError> {
        // Find-or-create plus the additive update happen under a single
        // write guard, so concurrent same-day calls merge instead of
        // overwriting each other.
        let mut state = self.state.write().await;
        let day = today();
        let key = (user_id.to_string(), day);
        let record = state.activity.entry(key).or_insert_with(|| UserActivity {
            id: new_id(),
            user_id: user_id.to_string(),
            day,
            minutes_active: 0,
            questions_solved: 0,
        });
        record.minutes_active += minutes_delta.max(0);
        record.questions_solved += questions_delta.max(0);
        Ok(record.clone())
    }

    async fn get_activity(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Option<UserActivity>, StoreError> {
        let state = self.state.read().await;
        let key = (user_id.to_string(), day);
        Ok(state.activity.get(&key).cloned())
    }

    async fn list_activity(&self, user_id: &str) -> Result<Vec<UserActivity>, StoreError> {
        let state = self.state.read().await;
        let mut records: Vec<UserActivity> = state
            .activity
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.day.cmp(&a.day));
        Ok(records)
    }
}
