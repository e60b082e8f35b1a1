//! atn-correct library - batch repair of missing-checkout anomalies
//!
//! Re-runs the pairing scan over every record still flagged MISSING_OUT.
//! Late or out-of-order terminal syncs routinely land a check-out after the
//! check-in was already flagged; this job clears those false positives and
//! reports the anomalies that remain legitimate. Safe to re-run: each
//! record is evaluated and committed independently.

use atn_common::db::models::AttendanceRecord;
use atn_common::pairing;
use atn_common::repo::AttendanceRepository;
use atn_common::Result;
use serde::Serialize;
use tracing::{info, warn};

/// What the corrector should cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectionScope {
    Global,
    Tenant(String),
}

/// A single record that could not be re-evaluated
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionError {
    pub record_id: String,
    pub message: String,
}

/// Typed batch report returned to the caller
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrectionReport {
    /// Flags cleared because a matching check-out exists after all
    pub fixed_count: u64,
    /// Flags confirmed legitimate: still no matching check-out
    pub still_missing_count: u64,
    /// Per-record failures; they never abort the batch
    pub errors: Vec<CorrectionError>,
}

/// Re-evaluate every flagged MISSING_OUT record in scope.
///
/// On pairing found the anomaly triple is cleared and nothing else is
/// stamped; the `corrected_at` trail belongs to human corrections made
/// elsewhere in the system. Running twice over unchanged data yields
/// identical counts.
pub async fn correct_all(
    attendance: &dyn AttendanceRepository,
    scope: &CorrectionScope,
) -> Result<CorrectionReport> {
    let tenant = match scope {
        CorrectionScope::Global => None,
        CorrectionScope::Tenant(id) => Some(id.as_str()),
    };

    let flagged = attendance.flagged_missing_out(tenant).await?;
    info!(
        flagged = flagged.len(),
        scope = tenant.unwrap_or("global"),
        "re-evaluating missing-checkout flags"
    );

    let mut report = CorrectionReport::default();

    for record in &flagged {
        match reevaluate(attendance, record).await {
            Ok(true) => report.fixed_count += 1,
            Ok(false) => report.still_missing_count += 1,
            Err(e) => {
                warn!(record_id = %record.id, "re-evaluation failed: {e}");
                report.errors.push(CorrectionError {
                    record_id: record.id.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        fixed = report.fixed_count,
        still_missing = report.still_missing_count,
        errors = report.errors.len(),
        "correction pass complete"
    );

    Ok(report)
}

/// Returns true when the flag was cleared, false when it stands
async fn reevaluate(
    attendance: &dyn AttendanceRepository,
    record: &AttendanceRecord,
) -> Result<bool> {
    let day = attendance
        .day_records(&record.tenant_id, &record.employee_id, record.timestamp)
        .await?;

    if pairing::find_closing_out(&day, &record.id).is_some() {
        attendance.set_anomaly(&record.id, None).await?;
        info!(record_id = %record.id, "missing-checkout flag cleared");
        Ok(true)
    } else {
        Ok(false)
    }
}
