use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        find_conflict, ActivityType, ClassTimetable, ClientInfo, DayLessons, Schedule,
        ScheduleRequest, TeacherWeek,
    },
    error::{AppError, Result},
    repository::{ClassRepository, ProfileRepository, ScheduleRepository, SubjectRepository},
    service::activity_service::ActivityService,
};

pub struct ScheduleService {
    repo: Arc<dyn ScheduleRepository>,
    class_repo: Arc<dyn ClassRepository>,
    subject_repo: Arc<dyn SubjectRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    activity: Arc<ActivityService>,
}

impl ScheduleService {
    pub fn new(
        repo: Arc<dyn ScheduleRepository>,
        class_repo: Arc<dyn ClassRepository>,
        subject_repo: Arc<dyn SubjectRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        activity: Arc<ActivityService>,
    ) -> Self {
        Self { repo, class_repo, subject_repo, profile_repo, activity }
    }

    pub async fn create(&self, actor: Uuid, request: ScheduleRequest, client: &ClientInfo) -> Result<Schedule> {
        let schedule = self.checked(Uuid::new_v4(), request).await?;
        let created = self.repo.create(schedule).await?;

        self.log_change(actor, &created, "Added", client).await;
        Ok(created)
    }

    pub async fn update(
        &self,
        actor: Uuid,
        id: Uuid,
        request: ScheduleRequest,
        client: &ClientInfo,
    ) -> Result<Schedule> {
        self.repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

        let schedule = self.checked(id, request).await?;
        let updated = self.repo.update(schedule).await?;

        self.log_change(actor, &updated, "Updated", client).await;
        Ok(updated)
    }

    pub async fn delete(&self, actor: Uuid, id: Uuid, client: &ClientInfo) -> Result<()> {
        let schedule = self.repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;
        self.repo.delete(id).await?;

        self.log_change(actor, &schedule, "Removed", client).await;
        Ok(())
    }

    pub async fn class_timetable(&self, class_id: Uuid) -> Result<ClassTimetable> {
        let class = self.class_repo.find_by_id(class_id).await?
            .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;
        let entries = self.repo.list_by_class(class_id).await?;

        Ok(ClassTimetable::build(class.id, class.name, entries))
    }

    pub async fn teacher_week(&self, teacher_id: Uuid, week_offset: i64, today: NaiveDate) -> Result<TeacherWeek> {
        let entries = self.repo.list_by_teacher(teacher_id).await?;
        TeacherWeek::build(entries, today, week_offset)
            .ok_or_else(|| AppError::BadRequest(format!("Week offset out of range: {}", week_offset)))
    }

    pub async fn student_week(&self, class_id: Uuid) -> Result<Vec<DayLessons>> {
        let entries = self.repo.list_by_class(class_id).await?;
        Ok(DayLessons::group(&entries))
    }

    /// Validates references and runs the conflict guard for a prospective
    /// entry with the given id.
    async fn checked(&self, id: Uuid, request: ScheduleRequest) -> Result<Schedule> {
        request.validate()?;

        if self.class_repo.find_by_id(request.class_id).await?.is_none() {
            return Err(AppError::BadRequest("Class does not exist".to_string()));
        }
        if self.subject_repo.find_by_id(request.subject_id).await?.is_none() {
            return Err(AppError::BadRequest("Subject does not exist".to_string()));
        }
        if self.profile_repo.find_teacher(request.teacher_id).await?.is_none() {
            return Err(AppError::BadRequest("Teacher does not exist".to_string()));
        }

        let candidate = Schedule {
            id,
            class_id: request.class_id,
            subject_id: request.subject_id,
            teacher_id: request.teacher_id,
            day: request.day,
            period: request.period,
            room: request.room.trim().to_string(),
            notes: request.notes.filter(|n| !n.trim().is_empty()),
        };

        let existing = self
            .repo
            .list_conflict_candidates(candidate.day, candidate.period)
            .await?;

        if let Some(conflict) = find_conflict(&candidate, &existing) {
            tracing::warn!(
                day = %candidate.day,
                period = candidate.period.number(),
                "Schedule conflict rejected: {}",
                conflict
            );
            return Err(AppError::Conflict(conflict.to_string()));
        }

        Ok(candidate)
    }

    async fn log_change(&self, actor: Uuid, schedule: &Schedule, verb: &str, client: &ClientInfo) {
        self.activity
            .log(
                Some(actor),
                ActivityType::ScheduleUpdated,
                &format!(
                    "{} lesson on {} period {} in room {}",
                    verb,
                    schedule.day,
                    schedule.period.number(),
                    schedule.room
                ),
                client,
            )
            .await;
    }
}
