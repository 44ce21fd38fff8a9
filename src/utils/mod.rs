pub mod email;
pub mod jwt;
pub mod levels;
pub mod password;

pub use email::*;
pub use jwt::*;
pub use levels::*;
pub use password::*;
