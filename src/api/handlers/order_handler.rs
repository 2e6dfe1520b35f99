//! Order handlers: checkout, payment return, provider notifications and the
//! thank-you page.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Json, Redirect},
    routing::{get, post},
    Extension, Form, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::api::middleware::{CurrentUser, SessionHandle};
use crate::api::AppState;
use crate::config::PAYMENT_NOTIFY_PATH;
use crate::errors::AppResult;
use crate::services::{Checkout, PaymentReturn};
use crate::types::MessageResponse;

/// Parameters the payment provider appends to the return URL
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PaymentReturnQuery {
    /// Present when the payer confirmed the payment
    #[serde(rename = "PayerID")]
    pub payer_id: Option<String>,
}

/// Server-to-server payment notification; unknown fields are ignored
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PaymentNotification {
    pub txn_id: Option<String>,
    /// Order number we sent as the invoice
    pub invoice: Option<String>,
    pub payment_status: Option<String>,
    pub receiver_email: Option<String>,
    pub mc_gross: Option<String>,
}

/// Routes that need a logged-in session
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/order/register/", post(register_order))
}

/// Payment return routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/order/confirm/", get(confirm_order))
        .route("/order/thanks/", get(thanks))
        .route(PAYMENT_NOTIFY_PATH, post(payment_notification))
}

/// Turn the cart into a pending order and return the payment form
#[utoipa::path(
    post,
    path = "/order/register/",
    tag = "Orders",
    responses(
        (status = 200, description = "Order registered", body = Checkout),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "No customer profile, or a cart product no longer exists")
    ),
    security(("session_cookie" = []))
)]
pub async fn register_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<SessionHandle>,
) -> AppResult<Json<Checkout>> {
    let mut session = session.lock().await;
    let checkout = state
        .order_service
        .register_order(&mut session, current_user.id)
        .await?;
    Ok(Json(checkout))
}

/// Browser return from the payment provider
#[utoipa::path(
    get,
    path = "/order/confirm/",
    tag = "Orders",
    params(PaymentReturnQuery),
    responses(
        (status = 303, description = "To /order/thanks/ when confirmed, otherwise to /"),
        (status = 404, description = "No order stashed in the session")
    )
)]
pub async fn confirm_order(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Query(query): Query<PaymentReturnQuery>,
) -> AppResult<Redirect> {
    let session = session.lock().await;
    let outcome = state
        .order_service
        .confirm_payment(&session, query.payer_id)
        .await?;

    Ok(match outcome {
        PaymentReturn::Confirmed(_) => Redirect::to("/order/thanks/"),
        PaymentReturn::NotConfirmed => Redirect::to("/"),
    })
}

/// Acknowledge a payment notification from the provider
///
/// Order status follows the browser return, so the notification is only
/// recorded in the log.
#[utoipa::path(
    post,
    path = "/paypal/",
    tag = "Orders",
    request_body(
        content = PaymentNotification,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "Notification received")
    )
)]
pub async fn payment_notification(Form(notification): Form<PaymentNotification>) -> StatusCode {
    tracing::info!(
        txn_id = notification.txn_id.as_deref().unwrap_or_default(),
        invoice = notification.invoice.as_deref().unwrap_or_default(),
        payment_status = notification.payment_status.as_deref().unwrap_or_default(),
        receiver_email = notification.receiver_email.as_deref().unwrap_or_default(),
        amount = notification.mc_gross.as_deref().unwrap_or_default(),
        "Payment notification received"
    );
    StatusCode::OK
}

/// Thank-you page
#[utoipa::path(
    get,
    path = "/order/thanks/",
    tag = "Orders",
    responses(
        (status = 200, description = "Payment received", body = MessageResponse)
    )
)]
pub async fn thanks() -> Json<MessageResponse> {
    Json(MessageResponse::new("Thank you for your purchase"))
}
