use chrono::{DateTime, Utc};
use entities::{NewUser, Role, User};

use super::MemoryStore;
use crate::persistence::traits::UserRepository;
use crate::persistence::{new_id, StoreError};

impl UserRepository for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        // Both uniqueness checks run under the state write lock, so two
        // concurrent registrations cannot slip past each other.
        if state
            .users
            .values()
            .any(|u| u.username == new_user.username)
        {
            return Err(StoreError::Conflict("username"));
        }
        if let Some(key) = &new_user.external_key {
            if state
                .users
                .values()
                .any(|u| u.external_key.as_deref() == Some(key.as_str()))
            {
                return Err(StoreError::Conflict("external identity key"));
            }
        }

        let user = User {
            id: new_id(),
            username: new_user.username,
            password: new_user.password,
            role: new_user.role.unwrap_or(Role::User),
            streak: 0,
            last_daily_solve: None,
            external_key: new_user.external_key,
        };
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.get(id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get_user_by_external_key(&self, key: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.external_key.as_deref() == Some(key))
            .cloned())
    }

    async fn update_user_streak(
        &self,
        id: &str,
        streak: i64,
        last_daily_solve: Option<DateTime<Utc>>,
    ) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(id).map(|user| {
            user.streak = streak.max(0);
            if last_daily_solve.is_some() {
                user.last_daily_solve = last_daily_solve;
            }
            user.clone()
        }))
    }
}
