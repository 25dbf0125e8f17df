pub mod activity_service;
pub mod announcement_service;
pub mod attendance_service;
pub mod grade_service;
pub mod schedule_service;
pub mod user_service;
pub mod viewer_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::auth::AuthService;
use activity_service::ActivityService;
use announcement_service::AnnouncementService;
use attendance_service::AttendanceService;
use grade_service::GradeService;
use schedule_service::ScheduleService;
use user_service::UserService;
use viewer_service::ViewerService;

pub use activity_service::client_info;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub class_repo: Arc<dyn ClassRepository>,
    pub subject_repo: Arc<dyn SubjectRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
    pub attendance_repo: Arc<dyn AttendanceRepository>,
    pub grade_repo: Arc<dyn GradeRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
    pub auth_service: Arc<AuthService>,
    pub viewer_service: Arc<ViewerService>,
    pub activity_service: Arc<ActivityService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub schedule_service: Arc<ScheduleService>,
    pub attendance_service: Arc<AttendanceService>,
    pub grade_service: Arc<GradeService>,
    pub user_service: Arc<UserService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool) -> Self {
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let class_repo: Arc<dyn ClassRepository> = Arc::new(SqliteClassRepository::new(db_pool.clone()));
        let subject_repo: Arc<dyn SubjectRepository> = Arc::new(SqliteSubjectRepository::new(db_pool.clone()));
        let profile_repo: Arc<dyn ProfileRepository> = Arc::new(SqliteProfileRepository::new(db_pool.clone()));
        let announcement_repo: Arc<dyn AnnouncementRepository> =
            Arc::new(SqliteAnnouncementRepository::new(db_pool.clone()));
        let schedule_repo: Arc<dyn ScheduleRepository> = Arc::new(SqliteScheduleRepository::new(db_pool.clone()));
        let attendance_repo: Arc<dyn AttendanceRepository> =
            Arc::new(SqliteAttendanceRepository::new(db_pool.clone()));
        let grade_repo: Arc<dyn GradeRepository> = Arc::new(SqliteGradeRepository::new(db_pool.clone()));
        let activity_repo: Arc<dyn ActivityRepository> = Arc::new(SqliteActivityRepository::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(db_pool.clone()));
        let activity_service = Arc::new(ActivityService::new(activity_repo.clone()));
        let viewer_service = Arc::new(ViewerService::new(profile_repo.clone()));

        let announcement_service = Arc::new(AnnouncementService::new(
            announcement_repo.clone(),
            class_repo.clone(),
            subject_repo.clone(),
            activity_service.clone(),
        ));
        let schedule_service = Arc::new(ScheduleService::new(
            schedule_repo.clone(),
            class_repo.clone(),
            subject_repo.clone(),
            profile_repo.clone(),
            activity_service.clone(),
        ));
        let attendance_service = Arc::new(AttendanceService::new(
            attendance_repo.clone(),
            class_repo.clone(),
            subject_repo.clone(),
            profile_repo.clone(),
            activity_service.clone(),
        ));
        let grade_service = Arc::new(GradeService::new(
            grade_repo.clone(),
            profile_repo.clone(),
            activity_service.clone(),
        ));
        let user_service = Arc::new(UserService::new(
            user_repo.clone(),
            profile_repo.clone(),
            class_repo.clone(),
            subject_repo.clone(),
            auth_service.clone(),
            activity_service.clone(),
        ));

        Self {
            user_repo,
            class_repo,
            subject_repo,
            profile_repo,
            announcement_repo,
            schedule_repo,
            attendance_repo,
            grade_repo,
            activity_repo,
            auth_service,
            viewer_service,
            activity_service,
            announcement_service,
            schedule_service,
            attendance_service,
            grade_service,
            user_service,
            db_pool,
        }
    }
}
