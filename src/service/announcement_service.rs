use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        resolve, ActivityType, Announcement, AnnouncementDetail, AnnouncementStatusFilter,
        AnnouncementType, ClientInfo, CreateAnnouncementRequest, Role, TeacherAnnouncements,
        UpdateAnnouncementRequest, Viewer,
    },
    error::{AppError, Result},
    repository::{AnnouncementRepository, ClassRepository, SubjectRepository},
    service::activity_service::ActivityService,
};

pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
    class_repo: Arc<dyn ClassRepository>,
    subject_repo: Arc<dyn SubjectRepository>,
    activity: Arc<ActivityService>,
}

impl AnnouncementService {
    pub fn new(
        repo: Arc<dyn AnnouncementRepository>,
        class_repo: Arc<dyn ClassRepository>,
        subject_repo: Arc<dyn SubjectRepository>,
        activity: Arc<ActivityService>,
    ) -> Self {
        Self { repo, class_repo, subject_repo, activity }
    }

    /// Live announcements the viewer may see, newest first.
    pub async fn visible_for(&self, viewer: &Viewer, limit: Option<usize>) -> Result<Vec<AnnouncementDetail>> {
        let now = Utc::now();
        let mut visible = resolve(viewer, self.repo.list_live(now).await?, now);

        if let Some(limit) = limit {
            visible.truncate(limit);
        }

        Ok(visible)
    }

    pub async fn get_for(&self, viewer: &Viewer, id: Uuid) -> Result<AnnouncementDetail> {
        let detail = self.repo.find_detail(id).await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

        // Hidden announcements look the same as missing ones.
        if !viewer.can_open(&detail.announcement, Utc::now()) {
            return Err(AppError::NotFound("Announcement not found".to_string()));
        }

        Ok(detail)
    }

    pub async fn create(
        &self,
        viewer: &Viewer,
        mut request: CreateAnnouncementRequest,
        client: &ClientInfo,
    ) -> Result<Announcement> {
        request.normalize();
        request.validate()?;

        let announcement_type = self.check_authoring(
            viewer,
            request.announcement_type,
            request.target_class_id,
            request.target_subject_id,
        )
        .await?;

        let now = Utc::now();
        let announcement = Announcement {
            id: Uuid::new_v4(),
            title: request.title,
            content: request.content,
            announcement_type,
            priority: request.priority,
            author_id: viewer.id,
            target_class_id: request.target_class_id,
            target_subject_id: request.target_subject_id,
            created_at: now,
            updated_at: now,
            expiry_at: request.expiry_at,
            is_active: request.is_active,
        };

        let created = self.repo.create(announcement).await?;

        tracing::info!(
            announcement_id = %created.id,
            author = %viewer.id,
            kind = created.announcement_type.as_str(),
            "Announcement created"
        );
        self.activity
            .log(
                Some(viewer.id),
                ActivityType::AnnouncementCreated,
                &format!("Created announcement \"{}\"", created.title),
                client,
            )
            .await;

        Ok(created)
    }

    pub async fn update(
        &self,
        viewer: &Viewer,
        id: Uuid,
        mut request: UpdateAnnouncementRequest,
        client: &ClientInfo,
    ) -> Result<Announcement> {
        request.normalize();
        request.validate()?;

        let mut announcement = self.find_managed(viewer, id).await?;
        request.apply(&mut announcement);

        announcement.announcement_type = self.check_authoring(
            viewer,
            announcement.announcement_type,
            announcement.target_class_id,
            announcement.target_subject_id,
        )
        .await?;

        let updated = self.repo.update(id, announcement).await?;

        self.activity
            .log(
                Some(viewer.id),
                ActivityType::AnnouncementUpdated,
                &format!("Updated announcement \"{}\"", updated.title),
                client,
            )
            .await;

        Ok(updated)
    }

    pub async fn delete(&self, viewer: &Viewer, id: Uuid, client: &ClientInfo) -> Result<()> {
        let announcement = self.find_managed(viewer, id).await?;
        self.repo.delete(id).await?;

        self.activity
            .log(
                Some(viewer.id),
                ActivityType::AnnouncementDeleted,
                &format!("Deleted announcement \"{}\"", announcement.title),
                client,
            )
            .await;

        Ok(())
    }

    pub async fn teacher_overview(&self, viewer: &Viewer) -> Result<TeacherAnnouncements> {
        if viewer.teacher_id().is_none() {
            return Err(AppError::forbidden());
        }

        let own = self.repo.list_by_author(viewer.id).await?;
        let relevant = self
            .visible_for(viewer, None)
            .await?
            .into_iter()
            .filter(|detail| detail.announcement.author_id != viewer.id)
            .collect();

        Ok(TeacherAnnouncements { own, relevant })
    }

    pub async fn admin_list(
        &self,
        announcement_type: Option<AnnouncementType>,
        status: AnnouncementStatusFilter,
    ) -> Result<Vec<AnnouncementDetail>> {
        self.repo.list_filtered(announcement_type, status, Utc::now()).await
    }

    /// Loads an announcement the viewer is allowed to edit or delete.
    async fn find_managed(&self, viewer: &Viewer, id: Uuid) -> Result<Announcement> {
        let announcement = self.repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

        if !viewer.is_admin() && announcement.author_id != viewer.id {
            return Err(AppError::Forbidden(
                "Only the author or an administrator can change this announcement".to_string(),
            ));
        }

        Ok(announcement)
    }

    /// Applies the per-role authoring rules and returns the type to store.
    async fn check_authoring(
        &self,
        viewer: &Viewer,
        announcement_type: AnnouncementType,
        target_class_id: Option<Uuid>,
        target_subject_id: Option<Uuid>,
    ) -> Result<AnnouncementType> {
        if let Some(class_id) = target_class_id {
            if self.class_repo.find_by_id(class_id).await?.is_none() {
                return Err(AppError::BadRequest("Target class does not exist".to_string()));
            }
        }
        if let Some(subject_id) = target_subject_id {
            if self.subject_repo.find_by_id(subject_id).await?.is_none() {
                return Err(AppError::BadRequest("Target subject does not exist".to_string()));
            }
        }

        authoring_type(viewer, announcement_type, target_class_id, target_subject_id)
    }
}

fn authoring_type(
    viewer: &Viewer,
    announcement_type: AnnouncementType,
    target_class_id: Option<Uuid>,
    target_subject_id: Option<Uuid>,
) -> Result<AnnouncementType> {
    match &viewer.role {
        Role::Admin => {
            if target_class_id.is_none() && target_subject_id.is_none() {
                Ok(AnnouncementType::General)
            } else {
                Ok(announcement_type)
            }
        }
        Role::Teacher { subjects_taught, .. } => {
            if !matches!(announcement_type, AnnouncementType::General | AnnouncementType::Subject) {
                return Err(AppError::Forbidden(
                    "Teachers can only post general or subject announcements".to_string(),
                ));
            }
            if let Some(subject_id) = target_subject_id {
                if !subjects_taught.contains(&subject_id) {
                    return Err(AppError::Forbidden(
                        "You can only target subjects you teach".to_string(),
                    ));
                }
            } else if announcement_type == AnnouncementType::Subject {
                return Err(AppError::BadRequest(
                    "Subject announcements need a target subject".to_string(),
                ));
            }
            Ok(announcement_type)
        }
        Role::Student { .. } | Role::Other => Err(AppError::Forbidden(
            "Only teachers and administrators can post announcements".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn teacher(subjects: &[Uuid]) -> Viewer {
        Viewer::new(
            Uuid::new_v4(),
            Role::Teacher {
                teacher_id: Uuid::new_v4(),
                subjects_taught: subjects.iter().copied().collect::<HashSet<_>>(),
            },
        )
    }

    #[test]
    fn test_admin_untargeted_forced_general() {
        let admin = Viewer::new(Uuid::new_v4(), Role::Admin);
        let kind = authoring_type(&admin, AnnouncementType::Event, None, None).unwrap();
        assert_eq!(kind, AnnouncementType::General);

        let kind = authoring_type(&admin, AnnouncementType::Class, Some(Uuid::new_v4()), None).unwrap();
        assert_eq!(kind, AnnouncementType::Class);
    }

    #[test]
    fn test_teacher_restricted_to_general_and_subject() {
        let math = Uuid::new_v4();
        let viewer = teacher(&[math]);

        assert!(authoring_type(&viewer, AnnouncementType::Subject, None, Some(math)).is_ok());
        assert!(authoring_type(&viewer, AnnouncementType::General, None, None).is_ok());
        assert!(matches!(
            authoring_type(&viewer, AnnouncementType::School, None, None),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            authoring_type(&viewer, AnnouncementType::Subject, None, Some(Uuid::new_v4())),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            authoring_type(&viewer, AnnouncementType::Subject, None, None),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_students_cannot_author() {
        let student = Viewer::new(
            Uuid::new_v4(),
            Role::Student { student_id: Uuid::new_v4(), class_id: Uuid::new_v4() },
        );
        assert!(matches!(
            authoring_type(&student, AnnouncementType::General, None, None),
            Err(AppError::Forbidden(_))
        ));
        let other = Viewer::new(Uuid::new_v4(), Role::Other);
        assert!(authoring_type(&other, AnnouncementType::General, None, None).is_err());
    }
}
