//! Repository traits over the employee and attendance stores
//!
//! The engine never touches the database directly; it goes through these
//! injected traits so the guard's race behavior and the corrector can be
//! exercised in isolation against an in-memory store.

mod attendance;
mod employees;

pub use attendance::SqlAttendanceRepository;
pub use employees::SqlEmployeeRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::models::{AnomalyType, AttendanceRecord, Direction, Employee};
use crate::Result;

/// Outcome of an attendance insert attempt.
///
/// A unique-key conflict is an expected outcome under concurrent terminals,
/// not an error; callers reclassify it as a duplicate punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Conflict,
}

/// Read-only employee lookup, scoped by tenant
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Exact matricule match
    async fn find_by_matricule(
        &self,
        tenant_id: &str,
        matricule: &str,
    ) -> Result<Option<Employee>>;

    /// Set-membership match over a list of candidate matricules
    async fn find_by_matricule_any(
        &self,
        tenant_id: &str,
        candidates: &[String],
    ) -> Result<Option<Employee>>;

    /// Numeric-equality match over purely-numeric stored matricules.
    ///
    /// Last-resort pass covering stored matricules whose padding the
    /// variant list didn't anticipate.
    async fn find_by_numeric_matricule(
        &self,
        tenant_id: &str,
        value: i64,
    ) -> Result<Option<Employee>>;
}

/// Read/write attendance store, scoped by tenant
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Insert a new record; a unique-key conflict is reported, not raised
    async fn insert(&self, record: &AttendanceRecord) -> Result<InsertOutcome>;

    /// Record with the exact `(tenant, employee, timestamp, direction)` key
    async fn find_exact(
        &self,
        tenant_id: &str,
        employee_id: &str,
        timestamp: DateTime<Utc>,
        direction: Direction,
    ) -> Result<Option<AttendanceRecord>>;

    /// Earliest record for the employee/direction inside `[from, to]`
    async fn find_within(
        &self,
        tenant_id: &str,
        employee_id: &str,
        direction: Direction,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>>;

    /// All records for the employee on the UTC day around `day_of`,
    /// sorted ascending by timestamp
    async fn day_records(
        &self,
        tenant_id: &str,
        employee_id: &str,
        day_of: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>>;

    /// Every IN record currently flagged MISSING_OUT, optionally scoped
    /// to one tenant
    async fn flagged_missing_out(
        &self,
        tenant_id: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>>;

    /// Set or clear the anomaly triple on one record.
    ///
    /// `Some((kind, note))` flags the record; `None` clears it. Keeps
    /// `has_anomaly` and `anomaly_type` mutually consistent by always
    /// writing them together.
    async fn set_anomaly(
        &self,
        record_id: &str,
        anomaly: Option<(AnomalyType, &str)>,
    ) -> Result<()>;
}
