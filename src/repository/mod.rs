use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod activity_repository;
pub mod announcement_repository;
pub mod attendance_repository;
pub mod class_repository;
pub mod grade_repository;
pub mod profile_repository;
pub mod schedule_repository;
pub mod subject_repository;
pub mod user_repository;

pub use activity_repository::SqliteActivityRepository;
pub use announcement_repository::SqliteAnnouncementRepository;
pub use attendance_repository::SqliteAttendanceRepository;
pub use class_repository::SqliteClassRepository;
pub use grade_repository::SqliteGradeRepository;
pub use profile_repository::SqliteProfileRepository;
pub use schedule_repository::SqliteScheduleRepository;
pub use subject_repository::SqliteSubjectRepository;
pub use user_repository::SqliteUserRepository;

/// Account fields written by `UserRepository::create`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub is_staff: bool,
    pub is_active: bool,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts the account and its teacher or student profile atomically.
    async fn create(&self, user: NewUser, profile: &UserKind) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_password_hash(&self, username: &str) -> Result<Option<String>>;
    async fn list(&self) -> Result<Vec<User>>;
    async fn update(&self, id: Uuid, update: UpdateUserRequest) -> Result<User>;
    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<User>;
    async fn touch_last_login(&self, id: Uuid) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn count_staff(&self) -> Result<i64>;
}

#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn create(&self, name: &str) -> Result<SchoolClass>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SchoolClass>>;
    async fn list(&self) -> Result<Vec<ClassSummary>>;
    async fn update(&self, id: Uuid, name: &str) -> Result<SchoolClass>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait SubjectRepository: Send + Sync {
    async fn create(&self, name: &str) -> Result<Subject>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subject>>;
    async fn list(&self) -> Result<Vec<SubjectSummary>>;
    async fn update(&self, id: Uuid, name: &str) -> Result<Subject>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_teacher(&self, id: Uuid) -> Result<Option<Teacher>>;
    async fn find_teacher_by_user(&self, user_id: Uuid) -> Result<Option<Teacher>>;
    async fn find_student(&self, id: Uuid) -> Result<Option<Student>>;
    async fn find_student_by_user(&self, user_id: Uuid) -> Result<Option<Student>>;
    async fn update_teacher(&self, id: Uuid, phone: Option<String>, subject_ids: Option<Vec<Uuid>>) -> Result<Teacher>;
    async fn update_student(&self, id: Uuid, class_id: Option<Uuid>, phone: Option<String>) -> Result<Student>;
    async fn list_teachers(&self) -> Result<Vec<TeacherListing>>;
    async fn list_students(&self) -> Result<Vec<StudentListing>>;
    async fn list_students_in_class(&self, class_id: Uuid) -> Result<Vec<StudentListing>>;
    async fn count_teachers(&self) -> Result<i64>;
    async fn count_students(&self) -> Result<i64>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, announcement: Announcement) -> Result<Announcement>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>>;
    async fn find_detail(&self, id: Uuid) -> Result<Option<AnnouncementDetail>>;
    /// Active, unexpired announcements, newest first.
    async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<AnnouncementDetail>>;
    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<AnnouncementDetail>>;
    async fn list_filtered(
        &self,
        announcement_type: Option<AnnouncementType>,
        status: AnnouncementStatusFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<AnnouncementDetail>>;
    async fn update(&self, id: Uuid, announcement: Announcement) -> Result<Announcement>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, schedule: Schedule) -> Result<Schedule>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Schedule>>;
    async fn update(&self, schedule: Schedule) -> Result<Schedule>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn list_by_class(&self, class_id: Uuid) -> Result<Vec<ScheduleEntry>>;
    async fn list_by_teacher(&self, teacher_id: Uuid) -> Result<Vec<ScheduleEntry>>;
    /// Every entry occupying the given slot, for the conflict guard.
    async fn list_conflict_candidates(&self, day: Weekday, period: Period) -> Result<Vec<Schedule>>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Writes every mark for one (date, subject, period) key in a single
    /// transaction.
    async fn upsert_many(
        &self,
        teacher_id: Uuid,
        date: NaiveDate,
        subject_id: Option<Uuid>,
        period: Option<Period>,
        marks: &[AttendanceMark],
    ) -> Result<Vec<Attendance>>;
    async fn find_for(
        &self,
        student_id: Uuid,
        date: NaiveDate,
        subject_id: Option<Uuid>,
        period: Option<Period>,
    ) -> Result<Option<Attendance>>;
    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Attendance>>;
}

#[async_trait]
pub trait GradeRepository: Send + Sync {
    async fn record(&self, request: RecordGradeRequest, date: NaiveDate) -> Result<Grade>;
    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<GradeEntry>>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn record(
        &self,
        user_id: Option<Uuid>,
        activity_type: ActivityType,
        description: &str,
        client: &ClientInfo,
    ) -> Result<ActivityLog>;
    async fn recent(&self, limit: i64) -> Result<Vec<ActivityLog>>;
    async fn search(&self, query: &ActivityQuery, per_page: i64) -> Result<ActivityPage>;
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| crate::error::AppError::Database(e.to_string()))
}

pub(crate) fn parse_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
    s.as_deref().map(parse_uuid).transpose()
}
