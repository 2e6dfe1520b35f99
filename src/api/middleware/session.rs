//! Session middleware.
//!
//! Loads the session named by the signed cookie before the handler runs and
//! writes it back afterwards when the handler modified it.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::api::AppState;
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::Session;
use crate::errors::AppError;

/// Request-scoped access to the current session
#[derive(Clone, Debug)]
pub struct SessionHandle(Arc<Mutex<Session>>);

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().await
    }
}

pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_owned());
    let session = state.sessions.load(token.as_deref()).await?;

    let handle = SessionHandle::new(session);
    request.extensions_mut().insert(handle.clone());

    let response = next.run(request).await;

    let session = handle.lock().await;
    match state.sessions.commit(&session).await? {
        Some(token) => {
            let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            Ok((jar.add(cookie), response).into_response())
        }
        None => Ok(response),
    }
}
