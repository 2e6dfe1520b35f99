//! Login-required middleware.

use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use super::session::SessionHandle;
use crate::errors::AppError;

/// Identity bound to the current session
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
}

/// Reject requests whose session has no logged-in user.
///
/// Must run inside the session middleware; injects `CurrentUser` into the
/// request extensions.
pub async fn login_required(mut request: Request, next: Next) -> Result<Response, AppError> {
    let handle = request
        .extensions()
        .get::<SessionHandle>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;
    let user_id = handle.lock().await.user_id().ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(CurrentUser { id: user_id });

    Ok(next.run(request).await)
}
