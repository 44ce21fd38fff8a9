pub mod admin;
pub mod auth;
pub mod sweepstake;
pub mod user;

pub use admin::admin_config;
pub use auth::auth_config;
pub use sweepstake::sweepstake_config;
pub use user::user_config;

use actix_web::{HttpMessage, HttpRequest, web};

use crate::error::{AppError, AppResult};
use crate::models::AuthUser;

/// Caller inserted by the auth middleware, if the request carried a valid token
pub(crate) fn auth_user(req: &HttpRequest) -> Option<AuthUser> {
    req.extensions().get::<AuthUser>().copied()
}

pub(crate) fn require_auth(req: &HttpRequest) -> AppResult<AuthUser> {
    auth_user(req).ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

/// Everything mounted under `/api/v1`
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth_config)
        .configure(user_config)
        .configure(sweepstake_config)
        .configure(admin_config);
}
