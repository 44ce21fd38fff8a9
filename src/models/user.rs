use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{UserRole, user_entity as users};
use crate::utils::{LevelInfo, level_for};

/// Authenticated caller, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Advertisers manage their own sweepstakes; admins manage all of them
    pub fn can_manage(&self, owner_id: i64) -> bool {
        self.is_admin() || (self.role == UserRole::Advertiser && self.user_id == owner_id)
    }
}

/// Self-service sign-up picks between the two public account types
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    User,
    Advertiser,
}

impl From<AccountType> for UserRole {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::User => UserRole::User,
            AccountType::Advertiser => UserRole::Advertiser,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
    #[schema(example = "Ana")]
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub account_type: Option<AccountType>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            role: user.role,
            points: user.points,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub lifetime_points: i64,
    pub level: LevelInfo,
}

impl From<users::Model> for UserProfileResponse {
    fn from(user: users::Model) -> Self {
        let lifetime_points = user.lifetime_points;
        Self {
            user: user.into(),
            lifetime_points,
            level: level_for(lifetime_points),
        }
    }
}
