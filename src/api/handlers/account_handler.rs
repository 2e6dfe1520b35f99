//! Account handlers: sign up, login, logout and the account form.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{CurrentUser, SessionHandle};
use crate::api::AppState;
use crate::domain::{AccountForm, AccountView, UserResponse};
use crate::errors::AppResult;
use crate::types::{Created, MessageResponse};

/// Credentials for login and account creation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    #[schema(example = "jdoe")]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "s3cret-pass")]
    pub password: String,
}

/// Routes open to anonymous sessions
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/users/login/", post(login))
        .route("/users/logout/", post(logout))
        .route("/users/create/", post(create_account))
}

/// Routes that need a logged-in session
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/users/account/", get(get_account).post(update_account))
}

/// Authenticate and bind the identity to the session
#[utoipa::path(
    post,
    path = "/users/login/",
    tag = "Accounts",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Logged in", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    ValidatedJson(payload): ValidatedJson<CredentialsRequest>,
) -> AppResult<Json<UserResponse>> {
    let mut session = session.lock().await;
    let user = state
        .account_service
        .login(&mut session, payload.username, payload.password)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Forget the identity and the cart
#[utoipa::path(
    post,
    path = "/users/logout/",
    tag = "Accounts",
    responses(
        (status = 200, description = "Session flushed", body = MessageResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Json<MessageResponse> {
    let mut session = session.lock().await;
    state.account_service.logout(&mut session);
    Json(MessageResponse::new("Logged out"))
}

/// Create an account and log it in
#[utoipa::path(
    post,
    path = "/users/create/",
    tag = "Accounts",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    ValidatedJson(payload): ValidatedJson<CredentialsRequest>,
) -> AppResult<Created<UserResponse>> {
    let mut session = session.lock().await;
    let user = state
        .account_service
        .create_account(&mut session, payload.username, payload.password)
        .await?;

    Ok(Created(UserResponse::from(user)))
}

/// Read the account form
#[utoipa::path(
    get,
    path = "/users/account/",
    tag = "Accounts",
    responses(
        (status = 200, description = "Identity fields, plus profile fields once a profile exists"),
        (status = 401, description = "Not logged in")
    ),
    security(("session_cookie" = []))
)]
pub async fn get_account(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<AccountView>> {
    let view = state.account_service.account(current_user.id).await?;
    Ok(Json(view))
}

/// Save the account form
#[utoipa::path(
    post,
    path = "/users/account/",
    tag = "Accounts",
    request_body = AccountForm,
    responses(
        (status = 200, description = "Saved account"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not logged in")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_account(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(form): ValidatedJson<AccountForm>,
) -> AppResult<Json<AccountView>> {
    let view = state
        .account_service
        .update_account(current_user.id, form)
        .await?;
    Ok(Json(view))
}
