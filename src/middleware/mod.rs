pub mod permission;
pub mod session;

pub use permission::require;
pub use session::{session_auth_middleware, CurrentUser};
