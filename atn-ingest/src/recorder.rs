//! Event recorder, the request-facing entry point
//!
//! Orchestrates one raw terminal punch through classification, employee
//! resolution, the debounce guard, persistence, and ingestion-time anomaly
//! feedback. Failures local to one punch never become process failures.

use std::sync::Arc;

use atn_common::config::EngineConfig;
use atn_common::db::models::{
    AnomalyType, AttendanceRecord, AuthMethod, Direction,
};
use atn_common::repo::{AttendanceRepository, EmployeeRepository, InsertOutcome};
use atn_common::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::classifier;
use crate::detector;
use crate::guard::{self, Admission, RejectReason};
use crate::resolver;

/// One raw punch as reported by a terminal. Ephemeral: consumed exactly
/// once by [`EventRecorder::record`], never persisted as-is.
#[derive(Debug, Clone)]
pub struct RawPunchEvent {
    pub tenant_id: String,
    pub device_id: String,
    pub raw_employee_id: String,
    pub timestamp: DateTime<Utc>,
    pub raw_state_code: u8,
    pub method: AuthMethod,
    pub source: Option<String>,
    /// Opaque terminal payload, retained verbatim for audit
    pub raw_payload: Option<serde_json::Value>,
}

/// Outcome of recording one punch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    Created {
        id: String,
        direction: Direction,
        /// Informational only; authoritative anomaly state lives in the
        /// stored record
        anomaly: Option<AnomalyType>,
    },
    Duplicate {
        existing_id: String,
    },
    DebounceBlocked,
    EmployeeNotFound,
}

/// Orchestrates Classifier → Resolver → Guard → persistence → detection
pub struct EventRecorder {
    employees: Arc<dyn EmployeeRepository>,
    attendance: Arc<dyn AttendanceRepository>,
    config: EngineConfig,
}

impl EventRecorder {
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        attendance: Arc<dyn AttendanceRepository>,
        config: EngineConfig,
    ) -> Self {
        Self {
            employees,
            attendance,
            config,
        }
    }

    /// Record one raw punch.
    ///
    /// Only storage failures propagate as errors; every expected outcome
    /// (not found, duplicate, debounce) is a [`RecordStatus`] variant.
    pub async fn record(&self, event: RawPunchEvent) -> Result<RecordStatus> {
        let classification = classifier::classify(event.raw_state_code);
        if classification.is_degraded() {
            warn!(
                tenant_id = %event.tenant_id,
                device_id = %event.device_id,
                raw_state_code = event.raw_state_code,
                direction = classification.direction.as_str(),
                "unknown terminal state code, classified by parity"
            );
        }

        let employee = match resolver::resolve(
            self.employees.as_ref(),
            &event.tenant_id,
            &event.raw_employee_id,
            self.config.matricule_pad_width,
        )
        .await?
        {
            Some(employee) => employee,
            None => {
                info!(
                    tenant_id = %event.tenant_id,
                    raw_employee_id = %event.raw_employee_id,
                    "punch rejected: no employee matches the identifier"
                );
                return Ok(RecordStatus::EmployeeNotFound);
            }
        };

        match guard::admit(
            self.attendance.as_ref(),
            &event.tenant_id,
            &employee.id,
            Some(&event.device_id),
            event.timestamp,
            classification.direction,
            self.config.debounce_window_secs,
        )
        .await?
        {
            Admission::Admit => {}
            Admission::Reject(RejectReason::Duplicate { existing_id }) => {
                return Ok(RecordStatus::Duplicate { existing_id });
            }
            Admission::Reject(RejectReason::DebounceBlocked { .. }) => {
                return Ok(RecordStatus::DebounceBlocked);
            }
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            tenant_id: event.tenant_id.clone(),
            employee_id: employee.id.clone(),
            timestamp: event.timestamp,
            direction: classification.direction,
            category: classification.category,
            method: event.method,
            device_id: Some(event.device_id.clone()),
            source: event.source.clone(),
            has_anomaly: false,
            anomaly_type: None,
            anomaly_note: None,
            is_corrected: false,
            corrected_at: None,
            correction_note: None,
            raw_payload: event
                .raw_payload
                .as_ref()
                .map(|payload| payload.to_string()),
            created_at: Utc::now(),
        };

        match self.attendance.insert(&record).await? {
            InsertOutcome::Inserted => {}
            InsertOutcome::Conflict => {
                // Lost the race against a concurrent identical punch; the
                // unique index is authoritative, so report the winner
                let existing_id = self
                    .attendance
                    .find_exact(
                        &event.tenant_id,
                        &employee.id,
                        event.timestamp,
                        classification.direction,
                    )
                    .await?
                    .map(|r| r.id)
                    .unwrap_or_default();
                info!(
                    tenant_id = %event.tenant_id,
                    employee_id = %employee.id,
                    existing_id = %existing_id,
                    "concurrent duplicate caught by unique index"
                );
                return Ok(RecordStatus::Duplicate { existing_id });
            }
        }

        let anomaly = if self.config.detect_on_ingest {
            match classification.direction {
                Direction::In => {
                    detector::evaluate_in(
                        self.attendance.as_ref(),
                        &event.tenant_id,
                        &employee.id,
                        &record.id,
                        event.timestamp,
                    )
                    .await?
                }
                Direction::Out => {
                    detector::evaluate_out(
                        self.attendance.as_ref(),
                        &event.tenant_id,
                        &employee.id,
                        &record.id,
                        event.timestamp,
                    )
                    .await?
                }
                Direction::BreakStart | Direction::BreakEnd => None,
            }
        } else {
            None
        };

        info!(
            id = %record.id,
            tenant_id = %event.tenant_id,
            employee_id = %employee.id,
            direction = classification.direction.as_str(),
            anomaly = anomaly.map(|a| a.as_str()),
            "attendance recorded"
        );

        Ok(RecordStatus::Created {
            id: record.id,
            direction: classification.direction,
            anomaly,
        })
    }
}
