//! IN/OUT pairing scan
//!
//! Balanced-bracket matching over one employee-day of attendance records.
//! An IN opens a session, an OUT closes exactly one session, and break
//! punches never open or close anything. The scan is O(n) over the day's
//! records and is shared by ingestion-time detection and the batch
//! corrector so both always agree.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::db::models::{AttendanceRecord, Direction};

/// UTC calendar-day bounds `[00:00:00, 23:59:59.999]` around a timestamp
pub fn day_bounds(ts: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = ts.date_naive().and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

/// Find the OUT that closes the given IN record, if any.
///
/// `day_records` must hold one employee-day sorted ascending by timestamp
/// and contain the target. Walks forward from the target, skipping break
/// punches; each later IN nests one level deeper, each OUT either closes a
/// nested IN or, at nesting level zero, closes the target.
///
/// Returns `None` when the target is not in the slice or no OUT closes it
/// by end of day.
pub fn find_closing_out<'a>(
    day_records: &'a [AttendanceRecord],
    target_id: &str,
) -> Option<&'a AttendanceRecord> {
    let position = day_records.iter().position(|r| r.id == target_id)?;

    let mut nested = 0u32;
    for record in &day_records[position + 1..] {
        match record.direction {
            Direction::BreakStart | Direction::BreakEnd => continue,
            Direction::In => nested += 1,
            Direction::Out => {
                if nested == 0 {
                    return Some(record);
                }
                nested -= 1;
            }
        }
    }

    None
}

/// Find the IN that the given OUT record closes, if any.
///
/// Mirror of [`find_closing_out`]: walks backward from the target with the
/// same nesting discipline (an earlier OUT claims one earlier IN). Used to
/// recognize an OUT with no opening IN at ingestion time.
pub fn find_opening_in<'a>(
    day_records: &'a [AttendanceRecord],
    target_id: &str,
) -> Option<&'a AttendanceRecord> {
    let position = day_records.iter().position(|r| r.id == target_id)?;

    let mut nested = 0u32;
    for record in day_records[..position].iter().rev() {
        match record.direction {
            Direction::BreakStart | Direction::BreakEnd => continue,
            Direction::Out => nested += 1,
            Direction::In => {
                if nested == 0 {
                    return Some(record);
                }
                nested -= 1;
            }
        }
    }

    None
}
