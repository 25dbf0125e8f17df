use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolClass {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Class row for the admin listing; the count is derived, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    #[serde(flatten)]
    pub class: SchoolClass,
    pub student_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectSummary {
    #[serde(flatten)]
    pub subject: Subject,
    pub teacher_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NameRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: String,
    pub subject_ids: Vec<Uuid>,
}

impl Teacher {
    pub fn teaches(&self, subject_id: Uuid) -> bool {
        self.subject_ids.contains(&subject_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub user_id: Uuid,
    pub class_id: Uuid,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherListing {
    pub teacher_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub is_active: bool,
    pub phone: String,
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentListing {
    pub student_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub is_active: bool,
    pub phone: String,
    pub class_id: Uuid,
    pub class_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub students_count: i64,
    pub teachers_count: i64,
    pub classes_count: i64,
    pub recent_activities: Vec<super::ActivityLog>,
}
