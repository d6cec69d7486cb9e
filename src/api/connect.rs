//! Admin endpoints for the payments account connection.

use crate::account::{AccountStatusData, ConnectOutcome, RequestSignals};
use crate::api::AppState;
use crate::error::{AppError, AppErrorKind, AppResult, ValidationError};
use crate::middleware::error::get_request_id_from_headers;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Runs the connection handshake for the signals on the query string.
///
/// Redirects answer `303 See Other`. Notices and the pass-through account
/// check answer `200` with a JSON body.
pub async fn handle_connect(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let signals = RequestSignals::from_map(&query);

    match state.onboarding.handle_request(&signals, &state.merchant).await {
        ConnectOutcome::Redirect(redirect) => {
            info!("redirecting admin for account connection");
            Redirect::to(&redirect.location).into_response()
        }
        ConnectOutcome::Notice(notice) => {
            debug!(severity = ?notice.severity, "returning connection notice");
            Json(notice).into_response()
        }
        ConnectOutcome::PassThrough => Json(state.accounts.check_account_status().await).into_response(),
    }
}

pub async fn get_account_status(State(state): State<AppState>) -> Json<AccountStatusData> {
    Json(state.accounts.account_status_data().await)
}

#[derive(Debug, Deserialize)]
pub struct ConnectionQuery {
    /// `test` or `live`; selects which publishable key is returned.
    pub mode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResponse {
    pub connected: bool,
    pub account_id: Option<String>,
    pub publishable_key: Option<String>,
}

/// Connection summary for checkout integrations. Unlike the settings-page
/// endpoints, API failures are reported as errors.
pub async fn get_account_connection(
    State(state): State<AppState>,
    Query(query): Query<ConnectionQuery>,
    headers: HeaderMap,
) -> AppResult<Json<ConnectionResponse>> {
    let request_id = get_request_id_from_headers(&headers);
    let with_request_id = |e: AppError| match &request_id {
        Some(id) => e.with_request_id(id.clone()),
        None => e,
    };

    let is_test = match query.mode.as_deref() {
        None | Some("live") => false,
        Some("test") => true,
        Some(other) => {
            return Err(with_request_id(AppError::new(AppErrorKind::Validation(
                ValidationError::InvalidParameter {
                    field: "mode".to_string(),
                    reason: format!("expected 'test' or 'live', got '{}'", other),
                },
            ))))
        }
    };

    let connected = state
        .accounts
        .try_is_connected()
        .await
        .map_err(|e| with_request_id(e.into()))?;
    let account_id = state
        .accounts
        .account_id()
        .await
        .map_err(|e| with_request_id(e.into()))?;
    let publishable_key = state
        .accounts
        .publishable_key(is_test)
        .await
        .map_err(|e| with_request_id(e.into()))?;

    Ok(Json(ConnectionResponse {
        connected,
        account_id,
        publishable_key,
    }))
}
