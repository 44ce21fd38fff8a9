use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::UserProfileResponse;
use crate::store::RewardsStore;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn RewardsStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn RewardsStore>) -> Self {
        Self { store }
    }

    /// Profile with balance and loyalty level
    pub async fn get_user_profile(&self, user_id: i64) -> AppResult<UserProfileResponse> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(user.into())
    }
}
