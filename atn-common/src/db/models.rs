//! Database models and enums

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic direction of a punch.
///
/// Break punches get their own directions so the IN/OUT pairing scan can
/// skip them: a break never opens or closes a work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    In,
    Out,
    BreakStart,
    BreakEnd,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
            Direction::BreakStart => "BREAK_START",
            Direction::BreakEnd => "BREAK_END",
        }
    }
}

/// Terminal punch category, derived from the device-native state code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PunchCategory {
    CheckIn,
    CheckOut,
    BreakOut,
    BreakIn,
    OtIn,
    OtOut,
    Unknown,
}

/// Authentication modality reported by the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthMethod {
    #[default]
    Fingerprint,
    Face,
    Card,
    Pin,
    Other,
}

/// Attendance anomaly kinds.
///
/// MISSING_OUT detection and correction is fully implemented; MISSING_IN is
/// detected at OUT ingestion; DUPLICATE and UNKNOWN are recognized members
/// used by downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyType {
    MissingOut,
    MissingIn,
    Duplicate,
    Unknown,
}

impl AnomalyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::MissingOut => "MISSING_OUT",
            AnomalyType::MissingIn => "MISSING_IN",
            AnomalyType::Duplicate => "DUPLICATE",
            AnomalyType::Unknown => "UNKNOWN",
        }
    }
}

/// A canonical attendance record, owned by the engine.
///
/// Created once by the event recorder. Only the anomaly and correction
/// fields mutate afterwards, and only through the detector/corrector.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: String,
    pub tenant_id: String,
    pub employee_id: String,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub category: PunchCategory,
    pub method: AuthMethod,
    pub device_id: Option<String>,
    pub source: Option<String>,
    pub has_anomaly: bool,
    pub anomaly_type: Option<AnomalyType>,
    pub anomaly_note: Option<String>,
    pub is_corrected: bool,
    pub corrected_at: Option<DateTime<Utc>>,
    pub correction_note: Option<String>,
    /// Terminal payload retained verbatim for audit (JSON text)
    pub raw_payload: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Employee row, read-only inside this engine
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: String,
    pub tenant_id: String,
    /// Canonical personnel identifier, stored as a string but often numeric
    pub matricule: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_serde_spelling() {
        assert_eq!(serde_json::to_string(&Direction::In).unwrap(), "\"IN\"");
        assert_eq!(
            serde_json::to_string(&Direction::BreakStart).unwrap(),
            "\"BREAK_START\""
        );
        let d: Direction = serde_json::from_str("\"OUT\"").unwrap();
        assert_eq!(d, Direction::Out);
    }

    #[test]
    fn anomaly_serde_spelling() {
        assert_eq!(
            serde_json::to_string(&AnomalyType::MissingOut).unwrap(),
            "\"MISSING_OUT\""
        );
    }
}
