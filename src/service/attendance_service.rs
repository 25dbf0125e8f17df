use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    domain::{
        ActivityType, Attendance, AttendanceSheet, AttendanceStatus, AttendanceSummary,
        ClientInfo, Period, RosterEntry, SaveAttendanceRequest, SaveAttendanceResult, Viewer,
    },
    error::{AppError, Result},
    repository::{AttendanceRepository, ClassRepository, ProfileRepository, SubjectRepository},
    service::activity_service::ActivityService,
};

pub struct AttendanceService {
    repo: Arc<dyn AttendanceRepository>,
    class_repo: Arc<dyn ClassRepository>,
    subject_repo: Arc<dyn SubjectRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    activity: Arc<ActivityService>,
}

impl AttendanceService {
    pub fn new(
        repo: Arc<dyn AttendanceRepository>,
        class_repo: Arc<dyn ClassRepository>,
        subject_repo: Arc<dyn SubjectRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        activity: Arc<ActivityService>,
    ) -> Self {
        Self { repo, class_repo, subject_repo, profile_repo, activity }
    }

    /// Records one mark per student for the (date, subject, period) key,
    /// overwriting any earlier mark. Unknown students are skipped; the
    /// remaining marks are written together or not at all.
    pub async fn save(
        &self,
        teacher: &Viewer,
        request: SaveAttendanceRequest,
        client: &ClientInfo,
    ) -> Result<SaveAttendanceResult> {
        let teacher_id = teacher.teacher_id().ok_or_else(AppError::forbidden)?;

        if let Some(subject_id) = request.subject_id {
            if self.subject_repo.find_by_id(subject_id).await?.is_none() {
                return Err(AppError::BadRequest("Subject does not exist".to_string()));
            }
        }

        let mut marks = Vec::with_capacity(request.marks.len());
        let mut skipped = Vec::new();

        for mark in request.marks {
            if self.profile_repo.find_student(mark.student_id).await?.is_none() {
                tracing::warn!(student_id = %mark.student_id, "Skipping attendance for unknown student");
                skipped.push(mark.student_id);
                continue;
            }
            marks.push(mark);
        }

        let saved_count = self.repo
            .upsert_many(teacher_id, request.date, request.subject_id, request.period, &marks)
            .await?
            .len();

        tracing::info!(
            teacher_id = %teacher_id,
            date = %request.date,
            saved = saved_count,
            skipped = skipped.len(),
            "Attendance saved"
        );
        self.activity
            .log(
                Some(teacher.id),
                ActivityType::AttendanceSaved,
                &format!("Saved attendance for {} students on {}", saved_count, request.date),
                client,
            )
            .await;

        Ok(SaveAttendanceResult { saved_count, skipped })
    }

    /// The class roster for one lesson; students without a mark show as present.
    pub async fn roster(
        &self,
        class_id: Uuid,
        date: NaiveDate,
        subject_id: Option<Uuid>,
        period: Option<Period>,
    ) -> Result<AttendanceSheet> {
        if self.class_repo.find_by_id(class_id).await?.is_none() {
            return Err(AppError::NotFound("Class not found".to_string()));
        }

        let students = self.profile_repo.list_students_in_class(class_id).await?;

        let mut roster = Vec::with_capacity(students.len());
        for student in students {
            let recorded = self
                .repo
                .find_for(student.student_id, date, subject_id, period)
                .await?;

            roster.push(match recorded {
                Some(mark) => RosterEntry {
                    student_id: student.student_id,
                    full_name: student.full_name,
                    status: mark.status,
                    comment: mark.comment,
                    last_updated: Some(mark.updated_at),
                },
                None => RosterEntry {
                    student_id: student.student_id,
                    full_name: student.full_name,
                    status: AttendanceStatus::Present,
                    comment: String::new(),
                    last_updated: None,
                },
            });
        }

        let summary = AttendanceSummary::from_roster(&roster);

        Ok(AttendanceSheet {
            class_id,
            date,
            subject_id,
            period,
            roster,
            summary,
        })
    }

    pub async fn for_student(&self, student_id: Uuid) -> Result<Vec<Attendance>> {
        self.repo.list_by_student(student_id).await
    }
}
