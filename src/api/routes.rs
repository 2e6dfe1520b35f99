//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    account_routes, cart_routes, catalog_routes, checkout_routes, order_routes, profile_routes,
};
use super::middleware::{login_required, session_middleware};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Routes that need a logged-in session
    let protected = Router::new()
        .merge(profile_routes())
        .merge(checkout_routes())
        .route_layer(middleware::from_fn(login_required));

    Router::new()
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(account_routes())
        .merge(order_routes())
        .merge(protected)
        // Everything above sees the request's session
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<ServiceStatus>,
    sessions: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => ServiceStatus {
                status: "healthy",
                error: None,
            },
            Err(e) => ServiceStatus {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Health check endpoint with database and session store connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_status = match &state.database {
        Some(database) => Some(ServiceStatus::from_result(database.ping().await)),
        None => None,
    };
    let session_status = ServiceStatus::from_result(state.sessions.ping().await);

    let all_healthy =
        db_status.as_ref().map_or(true, ServiceStatus::is_healthy) && session_status.is_healthy();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth {
            database: db_status,
            sessions: session_status,
        },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
