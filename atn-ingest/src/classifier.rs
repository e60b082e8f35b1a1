//! Terminal state classification
//!
//! Maps the device-native numeric state code to a semantic punch category
//! and a stored direction. The terminal is authoritative: the backend never
//! second-guesses the state it reports.
//!
//! Standard biometric-terminal convention:
//!
//! | code | meaning    | stored direction |
//! |------|------------|------------------|
//! | 0    | Check-In   | IN               |
//! | 1    | Check-Out  | OUT              |
//! | 2    | Break-Out  | BREAK_START      |
//! | 3    | Break-In   | BREAK_END        |
//! | 4    | OT-In      | IN               |
//! | 5    | OT-Out     | OUT              |
//!
//! Codes outside the table fall back to a parity rule (even = IN, odd =
//! OUT) with category UNKNOWN. Callers log those as degraded-confidence
//! classifications; they never block ingestion.

use atn_common::db::models::{Direction, PunchCategory};

/// Result of classifying a raw terminal state code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub direction: Direction,
    pub category: PunchCategory,
}

impl Classification {
    /// True when the code fell outside the documented table
    pub fn is_degraded(&self) -> bool {
        self.category == PunchCategory::Unknown
    }
}

/// Classify a raw terminal state code. Total: never fails, never panics.
pub fn classify(raw_state_code: u8) -> Classification {
    match raw_state_code {
        0 => Classification {
            direction: Direction::In,
            category: PunchCategory::CheckIn,
        },
        1 => Classification {
            direction: Direction::Out,
            category: PunchCategory::CheckOut,
        },
        2 => Classification {
            direction: Direction::BreakStart,
            category: PunchCategory::BreakOut,
        },
        3 => Classification {
            direction: Direction::BreakEnd,
            category: PunchCategory::BreakIn,
        },
        4 => Classification {
            direction: Direction::In,
            category: PunchCategory::OtIn,
        },
        5 => Classification {
            direction: Direction::Out,
            category: PunchCategory::OtOut,
        },
        code => Classification {
            direction: if code % 2 == 0 {
                Direction::In
            } else {
                Direction::Out
            },
            category: PunchCategory::Unknown,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_codes_match_the_table() {
        assert_eq!(
            classify(0),
            Classification { direction: Direction::In, category: PunchCategory::CheckIn }
        );
        assert_eq!(
            classify(1),
            Classification { direction: Direction::Out, category: PunchCategory::CheckOut }
        );
        assert_eq!(
            classify(2),
            Classification { direction: Direction::BreakStart, category: PunchCategory::BreakOut }
        );
        assert_eq!(
            classify(3),
            Classification { direction: Direction::BreakEnd, category: PunchCategory::BreakIn }
        );
        assert_eq!(
            classify(4),
            Classification { direction: Direction::In, category: PunchCategory::OtIn }
        );
        assert_eq!(
            classify(5),
            Classification { direction: Direction::Out, category: PunchCategory::OtOut }
        );
    }

    #[test]
    fn unknown_codes_fall_back_to_parity() {
        let even = classify(8);
        assert_eq!(even.direction, Direction::In);
        assert_eq!(even.category, PunchCategory::Unknown);
        assert!(even.is_degraded());

        let odd = classify(255);
        assert_eq!(odd.direction, Direction::Out);
        assert_eq!(odd.category, PunchCategory::Unknown);
    }

    #[test]
    fn total_over_the_whole_domain() {
        for code in 0..=u8::MAX {
            let _ = classify(code);
        }
    }
}
