//! HTTP boundary.

pub mod connect;

use crate::account::{AccountService, ConnectionStateMachine};
use crate::health::{HealthChecker, HealthStatus};
use crate::middleware::logging::{request_logging_middleware, UuidRequestId};
use crate::payments::MerchantInfo;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub onboarding: Arc<ConnectionStateMachine>,
    pub merchant: Arc<MerchantInfo>,
    pub health_checker: HealthChecker,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/admin/payments/connect", get(connect::handle_connect))
        .route("/admin/payments/account", get(connect::get_account_status))
        .route(
            "/admin/payments/account/connection",
            get(connect::get_account_connection),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(axum::middleware::from_fn(request_logging_middleware))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

async fn health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, (StatusCode, Json<HealthStatus>)> {
    let health_status = state.health_checker.check_health().await;

    if health_status.is_healthy() {
        Ok(Json(health_status))
    } else {
        error!("Health check failed - service unhealthy");
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(health_status)))
    }
}
