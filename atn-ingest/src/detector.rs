//! Ingestion-time anomaly detection
//!
//! Runs the pairing scan right after a punch is persisted so the terminal
//! gets same-day feedback. The nightly corrector re-runs the same scan over
//! flagged history, so anything mis-flagged here (late or out-of-order
//! terminal syncs) heals on its own.

use atn_common::db::models::{AnomalyType, Direction};
use atn_common::pairing;
use atn_common::repo::AttendanceRepository;
use atn_common::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

const MISSING_OUT_NOTE: &str = "Check-in has no matching check-out by end of day";
const MISSING_IN_NOTE: &str = "Check-out has no matching check-in earlier the same day";

/// Evaluate a freshly stored IN record.
///
/// A brand-new check-in normally has no closing OUT yet, so it is flagged
/// MISSING_OUT on creation; the first closing OUT (or the corrector)
/// clears it. Returns the anomaly put on the record, if any.
pub async fn evaluate_in(
    attendance: &dyn AttendanceRepository,
    tenant_id: &str,
    employee_id: &str,
    record_id: &str,
    timestamp: DateTime<Utc>,
) -> Result<Option<AnomalyType>> {
    let day = attendance.day_records(tenant_id, employee_id, timestamp).await?;

    let own_anomaly = if pairing::find_closing_out(&day, record_id).is_some() {
        // Late-arriving IN: the closing OUT is already stored
        debug!(record_id, "check-in already paired at ingest");
        None
    } else {
        attendance
            .set_anomaly(record_id, Some((AnomalyType::MissingOut, MISSING_OUT_NOTE)))
            .await?;
        Some(AnomalyType::MissingOut)
    };

    // An out-of-order sync can deliver the IN after its OUT was already
    // flagged; this IN may be the opening that flag was waiting for
    for flagged in day.iter().filter(|r| {
        r.direction == Direction::Out
            && r.has_anomaly
            && r.anomaly_type == Some(AnomalyType::MissingIn)
    }) {
        if pairing::find_opening_in(&day, &flagged.id).is_some() {
            attendance.set_anomaly(&flagged.id, None).await?;
            info!(
                cleared_id = %flagged.id,
                by = record_id,
                "missing-checkin flag cleared by late check-in"
            );
        }
    }

    Ok(own_anomaly)
}

/// Evaluate a freshly stored OUT record.
///
/// Flags the OUT itself when nothing opens it (MISSING_IN), then clears
/// any earlier same-day check-in whose MISSING_OUT flag this OUT resolves.
/// Returns the anomaly put on the record, if any.
pub async fn evaluate_out(
    attendance: &dyn AttendanceRepository,
    tenant_id: &str,
    employee_id: &str,
    record_id: &str,
    timestamp: DateTime<Utc>,
) -> Result<Option<AnomalyType>> {
    let day = attendance.day_records(tenant_id, employee_id, timestamp).await?;

    let own_anomaly = if pairing::find_opening_in(&day, record_id).is_none() {
        attendance
            .set_anomaly(record_id, Some((AnomalyType::MissingIn, MISSING_IN_NOTE)))
            .await?;
        Some(AnomalyType::MissingIn)
    } else {
        None
    };

    // Same-day feedback: this OUT may close a check-in flagged at ingest
    for flagged in day.iter().filter(|r| {
        r.direction == Direction::In
            && r.has_anomaly
            && r.anomaly_type == Some(AnomalyType::MissingOut)
    }) {
        if pairing::find_closing_out(&day, &flagged.id).is_some() {
            attendance.set_anomaly(&flagged.id, None).await?;
            info!(
                cleared_id = %flagged.id,
                by = record_id,
                "missing-checkout flag cleared by same-day check-out"
            );
        }
    }

    Ok(own_anomaly)
}
