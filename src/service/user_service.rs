use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthService,
    domain::*,
    error::{AppError, Result},
    repository::{
        ClassRepository, NewUser, ProfileRepository, SubjectRepository, UserRepository,
    },
    service::activity_service::ActivityService,
};

const MIN_PASSWORD_LEN: usize = 8;
const DASHBOARD_ACTIVITY_COUNT: i64 = 5;

/// Account administration plus the class and subject catalogue.
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    class_repo: Arc<dyn ClassRepository>,
    subject_repo: Arc<dyn SubjectRepository>,
    auth_service: Arc<AuthService>,
    activity: Arc<ActivityService>,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        class_repo: Arc<dyn ClassRepository>,
        subject_repo: Arc<dyn SubjectRepository>,
        auth_service: Arc<AuthService>,
        activity: Arc<ActivityService>,
    ) -> Self {
        Self { user_repo, profile_repo, class_repo, subject_repo, auth_service, activity }
    }

    /// Checks credentials for an active account and stamps the login.
    pub async fn login(&self, username: &str, password: &str, client: &ClientInfo) -> Result<User> {
        let user = self.user_repo.find_by_username(username).await?
            .ok_or(AppError::Unauthorized)?;
        let hash = self.user_repo.get_password_hash(username).await?
            .ok_or(AppError::Unauthorized)?;

        if !AuthService::verify_password(password, &hash).await? {
            tracing::warn!(username = %username, "Failed login attempt");
            return Err(AppError::Unauthorized);
        }
        if !user.is_active {
            tracing::warn!(username = %username, "Login refused for inactive account");
            return Err(AppError::Unauthorized);
        }

        self.user_repo.touch_last_login(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        self.activity
            .log(Some(user.id), ActivityType::UserLogin, &format!("{} logged in", user.username), client)
            .await;

        Ok(user)
    }

    pub async fn logout(&self, user: &User, client: &ClientInfo) {
        tracing::info!(user_id = %user.id, "User logged out");
        self.activity
            .log(Some(user.id), ActivityType::UserLogout, &format!("{} logged out", user.username), client)
            .await;
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<User>> {
        self.user_repo.find_by_id(id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo.list().await
    }

    pub async fn list_teachers(&self) -> Result<Vec<TeacherListing>> {
        self.profile_repo.list_teachers().await
    }

    pub async fn list_students(&self) -> Result<Vec<StudentListing>> {
        self.profile_repo.list_students().await
    }

    pub async fn create_user(&self, actor: Uuid, request: CreateUserRequest, client: &ClientInfo) -> Result<User> {
        request.validate()?;

        if self.user_repo.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        match &request.profile {
            UserKind::Admin => {}
            UserKind::Teacher { subject_ids, .. } => self.ensure_subjects_exist(subject_ids).await?,
            UserKind::Student { class_id, .. } => self.ensure_class_exists(*class_id).await?,
        }

        let new_user = NewUser {
            username: request.username.trim().to_string(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password: request.password,
            is_staff: matches!(request.profile, UserKind::Admin),
            is_active: request.is_active,
        };

        let user = self.user_repo.create(new_user, &request.profile).await?;

        self.activity
            .log(Some(actor), ActivityType::UserCreated, &format!("Created user {}", user.username), client)
            .await;

        Ok(user)
    }

    pub async fn update_user(
        &self,
        actor: Uuid,
        id: Uuid,
        request: UpdateUserRequest,
        client: &ClientInfo,
    ) -> Result<User> {
        let existing = self.user_repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(password) = request.password.as_deref().filter(|p| !p.is_empty()) {
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(AppError::Validation("Password must be at least 8 characters".to_string()));
            }
            if request.confirm_password.as_deref() != Some(password) {
                return Err(AppError::Validation("Passwords do not match".to_string()));
            }
        }
        if actor == id && request.is_active == Some(false) {
            return Err(AppError::BadRequest("You cannot deactivate your own account".to_string()));
        }

        let profile = request.profile.clone();
        if let Some(subject_ids) = &profile.subject_ids {
            self.ensure_subjects_exist(subject_ids).await?;
        }
        if let Some(class_id) = profile.class_id {
            self.ensure_class_exists(class_id).await?;
        }

        let user = self.user_repo.update(id, request).await?;

        if let Some(teacher) = self.profile_repo.find_teacher_by_user(id).await? {
            if profile.phone.is_some() || profile.subject_ids.is_some() {
                self.profile_repo
                    .update_teacher(teacher.id, profile.phone.clone(), profile.subject_ids.clone())
                    .await?;
            }
        } else if let Some(student) = self.profile_repo.find_student_by_user(id).await? {
            if profile.phone.is_some() || profile.class_id.is_some() {
                self.profile_repo
                    .update_student(student.id, profile.class_id, profile.phone.clone())
                    .await?;
            }
        }

        if existing.is_active && !user.is_active {
            self.auth_service.invalidate_user_sessions(id).await?;
        }

        self.activity
            .log(Some(actor), ActivityType::UserUpdated, &format!("Updated user {}", user.username), client)
            .await;

        Ok(user)
    }

    pub async fn delete_user(&self, actor: Uuid, id: Uuid, client: &ClientInfo) -> Result<()> {
        if actor == id {
            return Err(AppError::BadRequest("You cannot delete your own account".to_string()));
        }

        let user = self.user_repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        self.user_repo.delete(id).await?;

        self.activity
            .log(Some(actor), ActivityType::UserDeleted, &format!("Deleted user {}", user.username), client)
            .await;

        Ok(())
    }

    pub async fn toggle_active(&self, actor: Uuid, id: Uuid, client: &ClientInfo) -> Result<User> {
        if actor == id {
            return Err(AppError::BadRequest("You cannot deactivate your own account".to_string()));
        }

        let user = self.user_repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let updated = self.user_repo.set_active(id, !user.is_active).await?;

        if !updated.is_active {
            self.auth_service.invalidate_user_sessions(id).await?;
        }

        let state = if updated.is_active { "activated" } else { "deactivated" };
        self.activity
            .log(
                Some(actor),
                ActivityType::UserStatusChanged,
                &format!("User {} {}", updated.username, state),
                client,
            )
            .await;

        Ok(updated)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        Ok(DashboardStats {
            students_count: self.profile_repo.count_students().await?,
            teachers_count: self.profile_repo.count_teachers().await?,
            classes_count: self.class_repo.count().await?,
            recent_activities: self.activity.recent(DASHBOARD_ACTIVITY_COUNT).await?,
        })
    }

    pub async fn list_classes(&self) -> Result<Vec<ClassSummary>> {
        self.class_repo.list().await
    }

    pub async fn create_class(&self, actor: Uuid, request: NameRequest, client: &ClientInfo) -> Result<SchoolClass> {
        request.validate()?;
        let class = self.class_repo.create(request.name.trim()).await?;

        self.activity
            .log(Some(actor), ActivityType::ClassCreated, &format!("Created class {}", class.name), client)
            .await;
        Ok(class)
    }

    pub async fn update_class(
        &self,
        actor: Uuid,
        id: Uuid,
        request: NameRequest,
        client: &ClientInfo,
    ) -> Result<SchoolClass> {
        request.validate()?;
        if self.class_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Class not found".to_string()));
        }
        let class = self.class_repo.update(id, request.name.trim()).await?;

        self.activity
            .log(Some(actor), ActivityType::ClassUpdated, &format!("Renamed class to {}", class.name), client)
            .await;
        Ok(class)
    }

    pub async fn delete_class(&self, actor: Uuid, id: Uuid, client: &ClientInfo) -> Result<()> {
        let class = self.class_repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;
        self.class_repo.delete(id).await?;

        self.activity
            .log(Some(actor), ActivityType::ClassDeleted, &format!("Deleted class {}", class.name), client)
            .await;
        Ok(())
    }

    pub async fn list_subjects(&self) -> Result<Vec<SubjectSummary>> {
        self.subject_repo.list().await
    }

    pub async fn create_subject(&self, actor: Uuid, request: NameRequest, client: &ClientInfo) -> Result<Subject> {
        request.validate()?;
        let subject = self.subject_repo.create(request.name.trim()).await?;

        self.activity
            .log(Some(actor), ActivityType::SubjectCreated, &format!("Created subject {}", subject.name), client)
            .await;
        Ok(subject)
    }

    pub async fn update_subject(
        &self,
        actor: Uuid,
        id: Uuid,
        request: NameRequest,
        client: &ClientInfo,
    ) -> Result<Subject> {
        request.validate()?;
        if self.subject_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Subject not found".to_string()));
        }
        let subject = self.subject_repo.update(id, request.name.trim()).await?;

        self.activity
            .log(Some(actor), ActivityType::SubjectUpdated, &format!("Renamed subject to {}", subject.name), client)
            .await;
        Ok(subject)
    }

    pub async fn delete_subject(&self, actor: Uuid, id: Uuid, client: &ClientInfo) -> Result<()> {
        let subject = self.subject_repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Subject not found".to_string()))?;
        self.subject_repo.delete(id).await?;

        self.activity
            .log(Some(actor), ActivityType::SubjectDeleted, &format!("Deleted subject {}", subject.name), client)
            .await;
        Ok(())
    }

    async fn ensure_class_exists(&self, class_id: Uuid) -> Result<()> {
        match self.class_repo.find_by_id(class_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::BadRequest("Class does not exist".to_string())),
        }
    }

    async fn ensure_subjects_exist(&self, subject_ids: &[Uuid]) -> Result<()> {
        for subject_id in subject_ids {
            if self.subject_repo.find_by_id(*subject_id).await?.is_none() {
                return Err(AppError::BadRequest(format!("Subject {} does not exist", subject_id)));
            }
        }
        Ok(())
    }
}
