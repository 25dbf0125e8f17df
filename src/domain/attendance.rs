use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Period;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[default]
    Present,
    AbsentWithReason,
    AbsentWithoutReason,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::AbsentWithReason => "absent_with_reason",
            AttendanceStatus::AbsentWithoutReason => "absent_without_reason",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "present" => Some(AttendanceStatus::Present),
            "absent_with_reason" => Some(AttendanceStatus::AbsentWithReason),
            "absent_without_reason" => Some(AttendanceStatus::AbsentWithoutReason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub id: Uuid,
    pub student_id: Uuid,
    pub teacher_id: Uuid,
    pub subject_id: Option<Uuid>,
    pub date: NaiveDate,
    pub period: Option<Period>,
    pub status: AttendanceStatus,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One student's mark in a batch save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub student_id: Uuid,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAttendanceRequest {
    pub date: NaiveDate,
    pub subject_id: Option<Uuid>,
    pub period: Option<Period>,
    #[serde(default)]
    pub marks: Vec<AttendanceMark>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveAttendanceResult {
    pub saved_count: usize,
    pub skipped: Vec<Uuid>,
}

/// A class roster line for the attendance sheet. Students without a
/// recorded mark show as present.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub student_id: Uuid,
    pub full_name: String,
    pub status: AttendanceStatus,
    pub comment: String,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceSummary {
    pub total: usize,
    pub present: usize,
    pub absent_with_reason: usize,
    pub absent_without_reason: usize,
    pub present_pct: u32,
    pub absent_with_reason_pct: u32,
    pub absent_without_reason_pct: u32,
}

impl AttendanceSummary {
    pub fn from_roster(roster: &[RosterEntry]) -> Self {
        let total = roster.len();
        let count = |status: AttendanceStatus| roster.iter().filter(|r| r.status == status).count();
        let pct = |n: usize| {
            if total == 0 {
                0
            } else {
                (n as f64 / total as f64 * 100.0).round() as u32
            }
        };

        let present = count(AttendanceStatus::Present);
        let absent_with_reason = count(AttendanceStatus::AbsentWithReason);
        let absent_without_reason = count(AttendanceStatus::AbsentWithoutReason);

        Self {
            total,
            present,
            absent_with_reason,
            absent_without_reason,
            present_pct: pct(present),
            absent_with_reason_pct: pct(absent_with_reason),
            absent_without_reason_pct: pct(absent_without_reason),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSheet {
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub subject_id: Option<Uuid>,
    pub period: Option<Period>,
    pub roster: Vec<RosterEntry>,
    pub summary: AttendanceSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(status: AttendanceStatus) -> RosterEntry {
        RosterEntry {
            student_id: Uuid::new_v4(),
            full_name: "S".to_string(),
            status,
            comment: String::new(),
            last_updated: None,
        }
    }

    #[test]
    fn test_summary_percentages() {
        let roster = vec![
            line(AttendanceStatus::Present),
            line(AttendanceStatus::Present),
            line(AttendanceStatus::AbsentWithReason),
        ];
        let summary = AttendanceSummary::from_roster(&roster);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.present_pct, 67);
        assert_eq!(summary.absent_with_reason_pct, 33);
        assert_eq!(summary.absent_without_reason_pct, 0);
    }

    #[test]
    fn test_empty_roster_summary() {
        let summary = AttendanceSummary::from_roster(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.present_pct, 0);
    }

    #[test]
    fn test_status_round_trip_through_storage_names() {
        for status in [
            AttendanceStatus::Present,
            AttendanceStatus::AbsentWithReason,
            AttendanceStatus::AbsentWithoutReason,
        ] {
            assert_eq!(AttendanceStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(AttendanceStatus::from_str("late"), None);
    }
}
