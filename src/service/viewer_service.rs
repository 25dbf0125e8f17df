use std::sync::Arc;

use crate::{
    domain::{Role, User, Viewer},
    error::Result,
    repository::ProfileRepository,
};

pub struct ViewerService {
    profile_repo: Arc<dyn ProfileRepository>,
}

impl ViewerService {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self { profile_repo }
    }

    /// Classifies a user for visibility. Staff accounts are admins; a
    /// teacher profile takes precedence over a student profile.
    pub async fn resolve(&self, user: &User) -> Result<Viewer> {
        if user.is_staff {
            return Ok(Viewer::new(user.id, Role::Admin));
        }

        if let Some(teacher) = self.profile_repo.find_teacher_by_user(user.id).await? {
            return Ok(Viewer::new(
                user.id,
                Role::Teacher {
                    teacher_id: teacher.id,
                    subjects_taught: teacher.subject_ids.into_iter().collect(),
                },
            ));
        }

        if let Some(student) = self.profile_repo.find_student_by_user(user.id).await? {
            return Ok(Viewer::new(
                user.id,
                Role::Student {
                    student_id: student.id,
                    class_id: student.class_id,
                },
            ));
        }

        Ok(Viewer::new(user.id, Role::Other))
    }
}
