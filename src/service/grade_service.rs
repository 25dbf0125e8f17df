use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{ActivityType, ClientInfo, Grade, GradeEntry, RecordGradeRequest, Role, Viewer},
    error::{AppError, Result},
    repository::{GradeRepository, ProfileRepository},
    service::activity_service::ActivityService,
};

pub struct GradeService {
    repo: Arc<dyn GradeRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    activity: Arc<ActivityService>,
}

impl GradeService {
    pub fn new(
        repo: Arc<dyn GradeRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        activity: Arc<ActivityService>,
    ) -> Self {
        Self { repo, profile_repo, activity }
    }

    pub async fn record(&self, teacher: &Viewer, request: RecordGradeRequest, client: &ClientInfo) -> Result<Grade> {
        request.validate()?;

        let Role::Teacher { subjects_taught, .. } = &teacher.role else {
            return Err(AppError::forbidden());
        };
        if !subjects_taught.contains(&request.subject_id) {
            return Err(AppError::Forbidden("You can only grade subjects you teach".to_string()));
        }
        if self.profile_repo.find_student(request.student_id).await?.is_none() {
            return Err(AppError::BadRequest("Student does not exist".to_string()));
        }

        let grade = self.repo.record(request, Utc::now().date_naive()).await?;

        self.activity
            .log(
                Some(teacher.id),
                ActivityType::GradeRecorded,
                &format!("Recorded grade for student {}", grade.student_id),
                client,
            )
            .await;

        Ok(grade)
    }

    pub async fn for_student(&self, student_id: Uuid) -> Result<Vec<GradeEntry>> {
        self.repo.list_by_student(student_id).await
    }
}
