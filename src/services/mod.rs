pub mod auth_service;
pub mod draw_engine;
pub mod points_service;
pub mod sweepstake_lifecycle;
pub mod sweepstake_service;
pub mod user_service;

pub use auth_service::*;
pub use points_service::*;
pub use sweepstake_service::*;
pub use user_service::*;
