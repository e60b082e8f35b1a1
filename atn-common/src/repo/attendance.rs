//! SQLite-backed attendance store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{AttendanceRepository, InsertOutcome};
use crate::db::models::{AnomalyType, AttendanceRecord, Direction};
use crate::pairing;
use crate::Result;

const RECORD_COLUMNS: &str = "id, tenant_id, employee_id, timestamp, direction, category, \
     method, device_id, source, has_anomaly, anomaly_type, anomaly_note, \
     is_corrected, corrected_at, correction_note, raw_payload, created_at";

/// Attendance repository over the shared SQLite pool
#[derive(Clone)]
pub struct SqlAttendanceRepository {
    pool: SqlitePool,
}

impl SqlAttendanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceRepository for SqlAttendanceRepository {
    async fn insert(&self, record: &AttendanceRecord) -> Result<InsertOutcome> {
        let result = sqlx::query(
            "INSERT INTO attendance (id, tenant_id, employee_id, timestamp, direction, \
             category, method, device_id, source, has_anomaly, anomaly_type, anomaly_note, \
             is_corrected, corrected_at, correction_note, raw_payload, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.tenant_id)
        .bind(&record.employee_id)
        .bind(record.timestamp)
        .bind(record.direction)
        .bind(record.category)
        .bind(record.method)
        .bind(&record.device_id)
        .bind(&record.source)
        .bind(record.has_anomaly)
        .bind(record.anomaly_type)
        .bind(&record.anomaly_note)
        .bind(record.is_corrected)
        .bind(record.corrected_at)
        .bind(&record.correction_note)
        .bind(&record.raw_payload)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Ok(InsertOutcome::Conflict)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_exact(
        &self,
        tenant_id: &str,
        employee_id: &str,
        timestamp: DateTime<Utc>,
        direction: Direction,
    ) -> Result<Option<AttendanceRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance \
             WHERE tenant_id = ? AND employee_id = ? AND timestamp = ? AND direction = ? \
             LIMIT 1"
        );
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(tenant_id)
            .bind(employee_id)
            .bind(timestamp)
            .bind(direction)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn find_within(
        &self,
        tenant_id: &str,
        employee_id: &str,
        direction: Direction,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance \
             WHERE tenant_id = ? AND employee_id = ? AND direction = ? \
               AND timestamp >= ? AND timestamp <= ? \
             ORDER BY timestamp ASC LIMIT 1"
        );
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(tenant_id)
            .bind(employee_id)
            .bind(direction)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn day_records(
        &self,
        tenant_id: &str,
        employee_id: &str,
        day_of: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>> {
        let (start, end) = pairing::day_bounds(day_of);

        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance \
             WHERE tenant_id = ? AND employee_id = ? \
               AND timestamp >= ? AND timestamp <= ? \
             ORDER BY timestamp ASC"
        );
        let records = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(tenant_id)
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn flagged_missing_out(
        &self,
        tenant_id: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>> {
        let records = match tenant_id {
            Some(tenant) => {
                let sql = format!(
                    "SELECT {RECORD_COLUMNS} FROM attendance \
                     WHERE tenant_id = ? AND direction = 'IN' \
                       AND has_anomaly = 1 AND anomaly_type = 'MISSING_OUT' \
                     ORDER BY timestamp ASC"
                );
                sqlx::query_as::<_, AttendanceRecord>(&sql)
                    .bind(tenant)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {RECORD_COLUMNS} FROM attendance \
                     WHERE direction = 'IN' \
                       AND has_anomaly = 1 AND anomaly_type = 'MISSING_OUT' \
                     ORDER BY timestamp ASC"
                );
                sqlx::query_as::<_, AttendanceRecord>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(records)
    }

    async fn set_anomaly(
        &self,
        record_id: &str,
        anomaly: Option<(AnomalyType, &str)>,
    ) -> Result<()> {
        let (has_anomaly, kind, note) = match anomaly {
            Some((kind, note)) => (true, Some(kind), Some(note.to_string())),
            None => (false, None, None),
        };

        sqlx::query(
            "UPDATE attendance SET has_anomaly = ?, anomaly_type = ?, anomaly_note = ? \
             WHERE id = ?",
        )
        .bind(has_anomaly)
        .bind(kind)
        .bind(note)
        .bind(record_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
