//! atn-ingest library - Attendance event ingestion service
//!
//! Turns raw terminal punches into canonical attendance records:
//! classification, employee resolution, debounce, persistence, and
//! ingestion-time anomaly feedback.

use std::sync::Arc;

use atn_common::config::EngineConfig;
use atn_common::repo::{SqlAttendanceRepository, SqlEmployeeRepository};
use axum::{routing::post, Router};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod classifier;
pub mod detector;
pub mod guard;
pub mod recorder;
pub mod resolver;

use recorder::EventRecorder;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub recorder: Arc<EventRecorder>,
}

impl AppState {
    /// Wire the recorder over SQLite repositories on the given pool
    pub fn new(db: SqlitePool, config: EngineConfig) -> Self {
        let employees = Arc::new(SqlEmployeeRepository::new(db.clone()));
        let attendance = Arc::new(SqlAttendanceRepository::new(db.clone()));
        let recorder = Arc::new(EventRecorder::new(employees, attendance, config));
        Self { db, recorder }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/attendance/webhook/state",
            post(api::handle_webhook_state),
        )
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
