//! Terminal webhook ingress
//!
//! `POST /api/attendance/webhook/state` is the endpoint terminals push
//! punches to. The `terminalState` field is authoritative for
//! classification; the terminal-declared `type` is advisory and ignored.
//! Device credentials travel in headers; the response always carries the
//! processing duration so terminal firmware can tune its timeouts.

use std::time::Instant;

use atn_common::db::models::{AnomalyType, AuthMethod, Direction};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::recorder::{RawPunchEvent, RecordStatus};
use crate::AppState;

/// Punch payload pushed by a terminal
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookStateRequest {
    /// Terminal-native employee identifier (the resolver's lookup key)
    pub employee_id: String,

    /// Punch instant, ISO-8601
    pub timestamp: DateTime<Utc>,

    /// Terminal-declared IN/OUT. Advisory only; classification uses
    /// `terminal_state`
    #[serde(rename = "type", default)]
    pub declared_type: Option<String>,

    /// Raw terminal state code, authoritative for classification
    pub terminal_state: u8,

    /// Authentication modality
    #[serde(default)]
    pub method: Option<AuthMethod>,

    /// Punch source, e.g. "TERMINAL"
    #[serde(default)]
    pub source: Option<String>,

    /// Opaque terminal payload, stored verbatim for audit
    #[serde(default)]
    pub raw_data: Option<serde_json::Value>,
}

/// Processing status reported back to the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookStatus {
    Created,
    Duplicate,
    DebounceBlocked,
    EmployeeNotFound,
    Error,
}

/// Webhook response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookStateResponse {
    pub status: WebhookStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Direction recorded (IN/OUT/BREAK_START/BREAK_END)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<AnomalyType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Processing time in milliseconds, for terminal-side timeout tuning
    pub duration: u64,
}

impl WebhookStateResponse {
    fn status_only(status: WebhookStatus, duration: u64) -> Self {
        Self {
            status,
            id: None,
            direction: None,
            anomaly: None,
            existing_id: None,
            error: None,
            duration,
        }
    }

    fn http_status(&self) -> StatusCode {
        match self.status {
            WebhookStatus::Created => StatusCode::CREATED,
            // Expected, non-error outcomes: the terminal already
            // delivered this punch
            WebhookStatus::Duplicate | WebhookStatus::DebounceBlocked => StatusCode::OK,
            WebhookStatus::EmployeeNotFound => StatusCode::NOT_FOUND,
            WebhookStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookStateResponse {
    fn into_response(self) -> Response {
        (self.http_status(), Json(self)).into_response()
    }
}

/// POST /api/attendance/webhook/state
///
/// Requires `X-Device-ID` and `X-Tenant-ID` headers; `X-API-Key` is
/// accepted for forward compatibility and not checked here (device
/// provisioning lives outside this engine).
pub async fn handle_webhook_state(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<WebhookStateRequest>,
) -> Response {
    let started = Instant::now();

    let (device_id, tenant_id) = match device_credentials(&headers) {
        Some(credentials) => credentials,
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Missing device credentials" })),
            )
                .into_response();
        }
    };

    let event = RawPunchEvent {
        tenant_id,
        device_id,
        raw_employee_id: body.employee_id,
        timestamp: body.timestamp,
        raw_state_code: body.terminal_state,
        method: body.method.unwrap_or_default(),
        source: body.source,
        raw_payload: body.raw_data,
    };

    let result = state.recorder.record(event).await;
    let duration = started.elapsed().as_millis() as u64;

    let response = match result {
        Ok(RecordStatus::Created { id, direction, anomaly }) => WebhookStateResponse {
            id: Some(id),
            direction: Some(direction),
            anomaly,
            ..WebhookStateResponse::status_only(WebhookStatus::Created, duration)
        },
        Ok(RecordStatus::Duplicate { existing_id }) => WebhookStateResponse {
            existing_id: Some(existing_id),
            ..WebhookStateResponse::status_only(WebhookStatus::Duplicate, duration)
        },
        Ok(RecordStatus::DebounceBlocked) => {
            WebhookStateResponse::status_only(WebhookStatus::DebounceBlocked, duration)
        }
        Ok(RecordStatus::EmployeeNotFound) => {
            WebhookStateResponse::status_only(WebhookStatus::EmployeeNotFound, duration)
        }
        Err(e) => {
            error!("webhook processing failed: {e}");
            WebhookStateResponse {
                error: Some(e.to_string()),
                ..WebhookStateResponse::status_only(WebhookStatus::Error, duration)
            }
        }
    };

    response.into_response()
}

fn device_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let device_id = headers.get("x-device-id")?.to_str().ok()?.to_string();
    let tenant_id = headers.get("x-tenant-id")?.to_str().ok()?.to_string();
    if device_id.is_empty() || tenant_id.is_empty() {
        return None;
    }
    Some((device_id, tenant_id))
}
