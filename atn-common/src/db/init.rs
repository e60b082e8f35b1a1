//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up
//! idempotently. The unique punch index created here is the authoritative
//! defense against duplicate inserts under concurrent requests; the
//! in-process debounce guard is only an advisory fast path.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc creates the database file if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_pragmas(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the full schema (tests and tools)
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        // A single connection so every handle sees the same in-memory db
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    configure_pragmas(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

async fn configure_pragmas(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer; terminals punch in
    // parallel while the corrector reads
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Create all tables and indexes (idempotent, safe to call multiple times)
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_employees_table(pool).await?;
    create_attendance_table(pool).await?;
    Ok(())
}

/// Employee store. Owned by the out-of-scope employee-management
/// collaborator; the engine only reads it for matricule resolution. The
/// table exists here so the engine runs and tests stand-alone.
async fn create_employees_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            matricule TEXT NOT NULL,
            UNIQUE (tenant_id, matricule)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_employees_tenant ON employees (tenant_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Canonical attendance records produced by the ingestion engine
async fn create_attendance_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            employee_id TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            direction TEXT NOT NULL,
            category TEXT NOT NULL,
            method TEXT NOT NULL,
            device_id TEXT,
            source TEXT,
            has_anomaly INTEGER NOT NULL DEFAULT 0,
            anomaly_type TEXT,
            anomaly_note TEXT,
            is_corrected INTEGER NOT NULL DEFAULT 0,
            corrected_at TEXT,
            correction_note TEXT,
            raw_payload TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Authoritative duplicate rejection: one punch per
    // (tenant, employee, instant, direction)
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_punch_key
        ON attendance (tenant_id, employee_id, timestamp, direction)
        "#,
    )
    .execute(pool)
    .await?;

    // Employee-day scans for pairing
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_attendance_employee_time
        ON attendance (tenant_id, employee_id, timestamp)
        "#,
    )
    .execute(pool)
    .await?;

    // Corrector scans over flagged records
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_attendance_anomaly
        ON attendance (has_anomaly, anomaly_type)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
