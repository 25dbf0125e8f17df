use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    UserLogin,
    UserLogout,
    UserCreated,
    UserUpdated,
    UserDeleted,
    UserStatusChanged,
    ClassCreated,
    ClassUpdated,
    ClassDeleted,
    SubjectCreated,
    SubjectUpdated,
    SubjectDeleted,
    AnnouncementCreated,
    AnnouncementUpdated,
    AnnouncementDeleted,
    ScheduleUpdated,
    AttendanceSaved,
    GradeRecorded,
}

impl ActivityType {
    pub const ALL: [ActivityType; 18] = [
        ActivityType::UserLogin,
        ActivityType::UserLogout,
        ActivityType::UserCreated,
        ActivityType::UserUpdated,
        ActivityType::UserDeleted,
        ActivityType::UserStatusChanged,
        ActivityType::ClassCreated,
        ActivityType::ClassUpdated,
        ActivityType::ClassDeleted,
        ActivityType::SubjectCreated,
        ActivityType::SubjectUpdated,
        ActivityType::SubjectDeleted,
        ActivityType::AnnouncementCreated,
        ActivityType::AnnouncementUpdated,
        ActivityType::AnnouncementDeleted,
        ActivityType::ScheduleUpdated,
        ActivityType::AttendanceSaved,
        ActivityType::GradeRecorded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::UserLogin => "user_login",
            ActivityType::UserLogout => "user_logout",
            ActivityType::UserCreated => "user_created",
            ActivityType::UserUpdated => "user_updated",
            ActivityType::UserDeleted => "user_deleted",
            ActivityType::UserStatusChanged => "user_status_changed",
            ActivityType::ClassCreated => "class_created",
            ActivityType::ClassUpdated => "class_updated",
            ActivityType::ClassDeleted => "class_deleted",
            ActivityType::SubjectCreated => "subject_created",
            ActivityType::SubjectUpdated => "subject_updated",
            ActivityType::SubjectDeleted => "subject_deleted",
            ActivityType::AnnouncementCreated => "announcement_created",
            ActivityType::AnnouncementUpdated => "announcement_updated",
            ActivityType::AnnouncementDeleted => "announcement_deleted",
            ActivityType::ScheduleUpdated => "schedule_updated",
            ActivityType::AttendanceSaved => "attendance_saved",
            ActivityType::GradeRecorded => "grade_recorded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub activity_type: ActivityType,
    pub description: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

/// Request origin recorded alongside an activity.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ActivityQuery {
    #[serde(rename = "type")]
    pub activity_type: Option<ActivityType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityPage {
    pub activities: Vec<ActivityLog>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}
