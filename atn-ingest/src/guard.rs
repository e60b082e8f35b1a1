//! Idempotency / debounce guard
//!
//! Suppresses duplicate and near-duplicate punches before they reach the
//! store: terminal retries, double-badges and multi-terminal echo all land
//! inside a short window around the original punch. This check is an
//! advisory fast path; the storage-level unique index remains the
//! authoritative backstop against concurrent inserts.

use atn_common::db::models::Direction;
use atn_common::repo::AttendanceRepository;
use atn_common::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Why a punch was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// A record with the identical punch key already exists
    Duplicate { existing_id: String },
    /// A record for the same employee/direction sits within the window
    DebounceBlocked { existing_id: String },
}

/// Guard verdict for one punch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admit,
    Reject(RejectReason),
}

/// Check a punch against existing records.
///
/// `device_id` plays no part in the match (echo from a second terminal is
/// exactly what the window must absorb) but it is logged for diagnosis.
pub async fn admit(
    attendance: &dyn AttendanceRepository,
    tenant_id: &str,
    employee_id: &str,
    device_id: Option<&str>,
    timestamp: DateTime<Utc>,
    direction: Direction,
    window_secs: i64,
) -> Result<Admission> {
    if let Some(existing) = attendance
        .find_exact(tenant_id, employee_id, timestamp, direction)
        .await?
    {
        debug!(
            tenant_id,
            employee_id,
            device_id,
            existing_id = %existing.id,
            "punch rejected: exact duplicate"
        );
        return Ok(Admission::Reject(RejectReason::Duplicate {
            existing_id: existing.id,
        }));
    }

    let window = Duration::seconds(window_secs.max(0));
    if let Some(existing) = attendance
        .find_within(
            tenant_id,
            employee_id,
            direction,
            timestamp - window,
            timestamp + window,
        )
        .await?
    {
        debug!(
            tenant_id,
            employee_id,
            device_id,
            existing_id = %existing.id,
            window_secs,
            "punch rejected: inside debounce window"
        );
        return Ok(Admission::Reject(RejectReason::DebounceBlocked {
            existing_id: existing.id,
        }));
    }

    Ok(Admission::Admit)
}
