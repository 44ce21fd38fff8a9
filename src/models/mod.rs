pub mod common;
pub mod pagination;
pub mod point_transaction;
pub mod sweepstake;
pub mod user;

pub use common::*;
pub use pagination::*;
pub use point_transaction::*;
pub use sweepstake::*;
pub use user::*;
