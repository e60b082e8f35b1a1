//! Integration tests for the batch correction pass

use atn_common::db::init::init_memory_database;
use atn_common::db::models::{
    AnomalyType, AttendanceRecord, AuthMethod, Direction, PunchCategory,
};
use atn_common::repo::{AttendanceRepository, SqlAttendanceRepository};
use atn_correct::{correct_all, CorrectionScope};
use chrono::{TimeZone, Utc};
use uuid::Uuid;

fn punch(tenant: &str, employee: &str, day: u32, hour: u32, direction: Direction) -> AttendanceRecord {
    let timestamp = Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap();
    AttendanceRecord {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant.to_string(),
        employee_id: employee.to_string(),
        timestamp,
        direction,
        category: match direction {
            Direction::In => PunchCategory::CheckIn,
            Direction::Out => PunchCategory::CheckOut,
            Direction::BreakStart => PunchCategory::BreakOut,
            Direction::BreakEnd => PunchCategory::BreakIn,
        },
        method: AuthMethod::Fingerprint,
        device_id: Some("term-1".to_string()),
        source: Some("TERMINAL".to_string()),
        has_anomaly: false,
        anomaly_type: None,
        anomaly_note: None,
        is_corrected: false,
        corrected_at: None,
        correction_note: None,
        raw_payload: None,
        created_at: timestamp,
    }
}

async fn seed(repo: &SqlAttendanceRepository, record: &AttendanceRecord, flag: bool) -> String {
    repo.insert(record).await.expect("insert");
    if flag {
        repo.set_anomaly(
            &record.id,
            Some((AnomalyType::MissingOut, "Check-in has no matching check-out by end of day")),
        )
        .await
        .expect("flag");
    }
    record.id.clone()
}

#[tokio::test]
async fn clears_false_positive_when_out_arrived_late() {
    let pool = init_memory_database().await.unwrap();
    let repo = SqlAttendanceRepository::new(pool.clone());

    // Flagged at ingest, but a late terminal sync delivered the OUT since
    let in_id = seed(&repo, &punch("t1", "e1", 2, 8, Direction::In), true).await;
    seed(&repo, &punch("t1", "e1", 2, 17, Direction::Out), false).await;

    let report = correct_all(&repo, &CorrectionScope::Global).await.unwrap();
    assert_eq!(report.fixed_count, 1);
    assert_eq!(report.still_missing_count, 0);
    assert!(report.errors.is_empty());

    let (has_anomaly, anomaly_type): (bool, Option<String>) =
        sqlx::query_as("SELECT has_anomaly, anomaly_type FROM attendance WHERE id = ?")
            .bind(&in_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(!has_anomaly);
    assert!(anomaly_type.is_none());
}

#[tokio::test]
async fn retains_legitimate_missing_out() {
    let pool = init_memory_database().await.unwrap();
    let repo = SqlAttendanceRepository::new(pool.clone());

    let in_id = seed(&repo, &punch("t1", "e1", 2, 8, Direction::In), true).await;

    let report = correct_all(&repo, &CorrectionScope::Global).await.unwrap();
    assert_eq!(report.fixed_count, 0);
    assert_eq!(report.still_missing_count, 1);

    let has_anomaly: bool =
        sqlx::query_scalar("SELECT has_anomaly FROM attendance WHERE id = ?")
            .bind(&in_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(has_anomaly);
}

#[tokio::test]
async fn nested_check_in_does_not_steal_the_only_out() {
    let pool = init_memory_database().await.unwrap();
    let repo = SqlAttendanceRepository::new(pool.clone());

    // IN 08:00 (flagged), IN 09:00, OUT 17:00: the nested 09:00 session
    // claims the OUT, so the 08:00 flag stands
    seed(&repo, &punch("t1", "e1", 2, 8, Direction::In), true).await;
    seed(&repo, &punch("t1", "e1", 2, 9, Direction::In), false).await;
    seed(&repo, &punch("t1", "e1", 2, 17, Direction::Out), false).await;

    let report = correct_all(&repo, &CorrectionScope::Global).await.unwrap();
    assert_eq!(report.fixed_count, 0);
    assert_eq!(report.still_missing_count, 1);
}

#[tokio::test]
async fn breaks_do_not_block_the_pairing() {
    let pool = init_memory_database().await.unwrap();
    let repo = SqlAttendanceRepository::new(pool.clone());

    seed(&repo, &punch("t1", "e1", 2, 8, Direction::In), true).await;
    seed(&repo, &punch("t1", "e1", 2, 12, Direction::BreakStart), false).await;
    seed(&repo, &punch("t1", "e1", 2, 13, Direction::BreakEnd), false).await;
    seed(&repo, &punch("t1", "e1", 2, 17, Direction::Out), false).await;

    let report = correct_all(&repo, &CorrectionScope::Global).await.unwrap();
    assert_eq!(report.fixed_count, 1);
    assert_eq!(report.still_missing_count, 0);
}

#[tokio::test]
async fn out_on_another_day_does_not_pair() {
    let pool = init_memory_database().await.unwrap();
    let repo = SqlAttendanceRepository::new(pool.clone());

    seed(&repo, &punch("t1", "e1", 2, 8, Direction::In), true).await;
    // Next calendar day
    seed(&repo, &punch("t1", "e1", 3, 1, Direction::Out), false).await;

    let report = correct_all(&repo, &CorrectionScope::Global).await.unwrap();
    assert_eq!(report.fixed_count, 0);
    assert_eq!(report.still_missing_count, 1);
}

#[tokio::test]
async fn tenant_scope_limits_the_pass() {
    let pool = init_memory_database().await.unwrap();
    let repo = SqlAttendanceRepository::new(pool.clone());

    seed(&repo, &punch("t1", "e1", 2, 8, Direction::In), true).await;
    seed(&repo, &punch("t1", "e1", 2, 17, Direction::Out), false).await;
    let other_id = seed(&repo, &punch("t2", "e9", 2, 8, Direction::In), true).await;
    seed(&repo, &punch("t2", "e9", 2, 17, Direction::Out), false).await;

    let report = correct_all(&repo, &CorrectionScope::Tenant("t1".to_string()))
        .await
        .unwrap();
    assert_eq!(report.fixed_count, 1);

    // The other tenant's flag is untouched
    let has_anomaly: bool =
        sqlx::query_scalar("SELECT has_anomaly FROM attendance WHERE id = ?")
            .bind(&other_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(has_anomaly);
}

#[tokio::test]
async fn rerun_on_unchanged_data_yields_identical_counts() {
    let pool = init_memory_database().await.unwrap();
    let repo = SqlAttendanceRepository::new(pool.clone());

    // Nothing fixable: both flags are legitimate
    seed(&repo, &punch("t1", "e1", 2, 8, Direction::In), true).await;
    seed(&repo, &punch("t1", "e2", 2, 9, Direction::In), true).await;

    let first = correct_all(&repo, &CorrectionScope::Global).await.unwrap();
    let second = correct_all(&repo, &CorrectionScope::Global).await.unwrap();

    assert_eq!(first.fixed_count, second.fixed_count);
    assert_eq!(first.still_missing_count, second.still_missing_count);
    assert_eq!(first.still_missing_count, 2);
}

#[tokio::test]
async fn second_run_after_fixes_finds_nothing_new() {
    let pool = init_memory_database().await.unwrap();
    let repo = SqlAttendanceRepository::new(pool.clone());

    seed(&repo, &punch("t1", "e1", 2, 8, Direction::In), true).await;
    seed(&repo, &punch("t1", "e1", 2, 17, Direction::Out), false).await;
    seed(&repo, &punch("t1", "e2", 2, 9, Direction::In), true).await;

    let first = correct_all(&repo, &CorrectionScope::Global).await.unwrap();
    assert_eq!(first.fixed_count, 1);
    assert_eq!(first.still_missing_count, 1);

    // The cleared flag stays cleared; the legitimate one stays flagged
    let second = correct_all(&repo, &CorrectionScope::Global).await.unwrap();
    assert_eq!(second.fixed_count, 0);
    assert_eq!(second.still_missing_count, 1);
}
