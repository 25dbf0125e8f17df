use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const PERIODS_PER_DAY: u8 = 8;
pub const LESSON_HOURS: f64 = 0.75;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == s.to_lowercase())
    }

    /// School day for a calendar date; Sunday has no lessons.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        match date.weekday() {
            chrono::Weekday::Mon => Some(Weekday::Monday),
            chrono::Weekday::Tue => Some(Weekday::Tuesday),
            chrono::Weekday::Wed => Some(Weekday::Wednesday),
            chrono::Weekday::Thu => Some(Weekday::Thursday),
            chrono::Weekday::Fri => Some(Weekday::Friday),
            chrono::Weekday::Sat => Some(Weekday::Saturday),
            chrono::Weekday::Sun => None,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lesson number within a day, 1 through 8.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct Period(u8);

impl Period {
    pub fn new(number: u8) -> Option<Self> {
        (1..=PERIODS_PER_DAY).contains(&number).then_some(Period(number))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Lessons start on the hour from 08:00 and last 45 minutes.
    pub fn time_slot(&self) -> String {
        let hour = 7 + self.0 as u32;
        format!("{:02}:00-{:02}:45", hour, hour)
    }

    pub fn all() -> impl Iterator<Item = Period> {
        (1..=PERIODS_PER_DAY).map(Period)
    }
}

impl TryFrom<u8> for Period {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Period::new(value).ok_or_else(|| format!("Period must be between 1 and {}", PERIODS_PER_DAY))
    }
}

impl From<Period> for u8 {
    fn from(period: Period) -> u8 {
        period.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub class_id: Uuid,
    pub subject_id: Uuid,
    pub teacher_id: Uuid,
    pub day: Weekday,
    pub period: Period,
    pub room: String,
    pub notes: Option<String>,
}

/// Schedule row with the names the timetable views display.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub class_name: String,
    pub subject_name: String,
    pub teacher_name: String,
    pub time_slot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleRequest {
    pub class_id: Uuid,
    pub subject_id: Uuid,
    pub teacher_id: Uuid,
    pub day: Weekday,
    pub period: Period,
    #[validate(length(min = 1, max = 20))]
    pub room: String,
    pub notes: Option<String>,
}

/// Which slot key a prospective entry would double-book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleConflict {
    Teacher,
    Room,
    Class,
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ScheduleConflict::Teacher => "Teacher already has a lesson at this time",
            ScheduleConflict::Room => "Room is already booked at this time",
            ScheduleConflict::Class => "Class already has a lesson at this time",
        };
        f.write_str(msg)
    }
}

/// First clash between `candidate` and `existing` on (teacher, day, period),
/// (room, day, period) or (class, day, period). An entry never clashes with
/// itself, so edits can be checked against the full table.
pub fn find_conflict<'a, I>(candidate: &Schedule, existing: I) -> Option<ScheduleConflict>
where
    I: IntoIterator<Item = &'a Schedule>,
{
    existing
        .into_iter()
        .filter(|other| other.id != candidate.id)
        .filter(|other| other.day == candidate.day && other.period == candidate.period)
        .find_map(|other| {
            if other.teacher_id == candidate.teacher_id {
                Some(ScheduleConflict::Teacher)
            } else if other.room.eq_ignore_ascii_case(&candidate.room) {
                Some(ScheduleConflict::Room)
            } else if other.class_id == candidate.class_id {
                Some(ScheduleConflict::Class)
            } else {
                None
            }
        })
}

#[derive(Debug, Clone, Serialize)]
pub struct TimetableDay {
    pub day: Weekday,
    /// One slot per period, `None` where the class is free.
    pub slots: Vec<Option<ScheduleEntry>>,
}

/// Six-day, eight-period grid for one class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassTimetable {
    pub class_id: Uuid,
    pub class_name: String,
    pub days: Vec<TimetableDay>,
}

impl ClassTimetable {
    pub fn build(class_id: Uuid, class_name: String, entries: Vec<ScheduleEntry>) -> Self {
        let mut days: Vec<TimetableDay> = Weekday::ALL
            .into_iter()
            .map(|day| TimetableDay {
                day,
                slots: vec![None; PERIODS_PER_DAY as usize],
            })
            .collect();

        for entry in entries {
            let day_index = Weekday::ALL
                .iter()
                .position(|d| *d == entry.schedule.day)
                .unwrap_or(0);
            let slot = entry.schedule.period.number() as usize - 1;
            days[day_index].slots[slot] = Some(entry);
        }

        Self {
            class_id,
            class_name,
            days,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayLessons {
    pub day: Weekday,
    pub lessons: Vec<ScheduleEntry>,
}

impl DayLessons {
    /// Buckets entries by weekday, Monday first, each day ordered by period.
    pub fn group(entries: &[ScheduleEntry]) -> Vec<DayLessons> {
        let mut days: Vec<DayLessons> = Weekday::ALL
            .into_iter()
            .map(|day| DayLessons {
                day,
                lessons: Vec::new(),
            })
            .collect();

        for entry in entries {
            if let Some(bucket) = days.iter_mut().find(|d| d.day == entry.schedule.day) {
                bucket.lessons.push(entry.clone());
            }
        }
        for bucket in &mut days {
            bucket.lessons.sort_by_key(|e| e.schedule.period);
        }

        days
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekStats {
    pub weekly_lessons: usize,
    pub classes: usize,
    pub subjects: usize,
    pub weekly_hours: f64,
    pub empty_slots: usize,
    pub busiest_day_lessons: usize,
}

/// A teacher's lessons for one calendar week.
#[derive(Debug, Clone, Serialize)]
pub struct TeacherWeek {
    pub week_offset: i64,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub iso_week: u32,
    pub days: Vec<DayLessons>,
    pub today: Vec<ScheduleEntry>,
    pub stats: WeekStats,
}

impl TeacherWeek {
    /// Returns `None` when the offset lands outside the representable
    /// calendar.
    pub fn build(entries: Vec<ScheduleEntry>, today: NaiveDate, week_offset: i64) -> Option<Self> {
        let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let week_start = monday.checked_add_signed(Duration::try_weeks(week_offset)?)?;
        let week_end = week_start.checked_add_signed(Duration::days(6))?;

        let days = DayLessons::group(&entries);

        let today_lessons = Weekday::from_date(today)
            .and_then(|day| days.iter().find(|d| d.day == day))
            .map(|d| d.lessons.clone())
            .unwrap_or_default();

        let stats = WeekStats {
            weekly_lessons: entries.len(),
            classes: entries.iter().map(|e| e.schedule.class_id).collect::<HashSet<_>>().len(),
            subjects: entries.iter().map(|e| e.schedule.subject_id).collect::<HashSet<_>>().len(),
            weekly_hours: (entries.len() as f64 * LESSON_HOURS * 10.0).round() / 10.0,
            empty_slots: (PERIODS_PER_DAY as usize * Weekday::ALL.len()).saturating_sub(entries.len()),
            busiest_day_lessons: days.iter().map(|d| d.lessons.len()).max().unwrap_or(0),
        };

        Some(Self {
            week_offset,
            week_start,
            week_end,
            iso_week: week_start.iso_week().week(),
            days,
            today: today_lessons,
            stats,
        })
    }
}
