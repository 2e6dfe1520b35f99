//! API middleware.

mod auth;
mod session;

pub use auth::{login_required, CurrentUser};
pub use session::{session_middleware, SessionHandle};
