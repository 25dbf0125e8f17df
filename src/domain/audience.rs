//! Announcement audience resolution.
//!
//! Decides which announcements a viewer may see and in which order. Every
//! announcement is judged on its own against the viewer's role; no state is
//! shared between announcements or calls, so resolution is safe to run from
//! any number of request handlers at once.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::Announcement;

/// The requesting user as far as visibility is concerned.
///
/// Built once per request from the user's account and profiles, see
/// `ViewerService::resolve`.
#[derive(Debug, Clone, Serialize)]
pub struct Viewer {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher {
        teacher_id: Uuid,
        subjects_taught: HashSet<Uuid>,
    },
    Student {
        student_id: Uuid,
        class_id: Uuid,
    },
    Other,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher { .. } => "teacher",
            Role::Student { .. } => "student",
            Role::Other => "other",
        }
    }
}

impl Viewer {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    pub fn teacher_id(&self) -> Option<Uuid> {
        match self.role {
            Role::Teacher { teacher_id, .. } => Some(teacher_id),
            _ => None,
        }
    }

    pub fn student_id(&self) -> Option<Uuid> {
        match self.role {
            Role::Student { student_id, .. } => Some(student_id),
            _ => None,
        }
    }

    /// Role predicate only; liveness is checked separately.
    pub fn can_see(&self, announcement: &Announcement) -> bool {
        match &self.role {
            Role::Admin => true,
            Role::Teacher { subjects_taught, .. } => {
                announcement.author_id == self.id
                    || announcement.announcement_type.is_broadcast()
                    || announcement
                        .target_subject_id
                        .map(|subject| subjects_taught.contains(&subject))
                        .unwrap_or(false)
                    || announcement.is_untargeted()
            }
            // Any subject-targeted announcement is visible to students; there
            // is no enrollment check.
            Role::Student { class_id, .. } => {
                announcement.announcement_type.is_broadcast()
                    || announcement.target_class_id == Some(*class_id)
                    || announcement.target_subject_id.is_some()
                    || announcement.is_untargeted()
            }
            Role::Other => false,
        }
    }

    /// Whether this viewer may open the announcement at all, including the
    /// inactive and expired ones its author and admins still manage.
    pub fn can_open(&self, announcement: &Announcement, now: DateTime<Utc>) -> bool {
        if self.is_admin() || announcement.author_id == self.id {
            return true;
        }
        announcement.is_live(now) && self.can_see(announcement)
    }
}

/// Filters `announcements` down to the live ones `viewer` may see, newest
/// first. Equal `created_at` values keep their input order.
pub fn resolve<T>(viewer: &Viewer, announcements: Vec<T>, now: DateTime<Utc>) -> Vec<T>
where
    T: AsRef<Announcement>,
{
    if matches!(viewer.role, Role::Other) {
        return Vec::new();
    }

    let mut visible: Vec<T> = announcements
        .into_iter()
        .filter(|item| {
            let announcement = item.as_ref();
            announcement.is_live(now) && viewer.can_see(announcement)
        })
        .collect();

    visible.sort_by(|a, b| b.as_ref().created_at.cmp(&a.as_ref().created_at));
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnnouncementType, Priority};
    use chrono::Duration;

    fn announcement(announcement_type: AnnouncementType) -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            title: "Notice".to_string(),
            content: "Body".to_string(),
            announcement_type,
            priority: Priority::Medium,
            author_id: Uuid::new_v4(),
            target_class_id: None,
            target_subject_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            expiry_at: None,
            is_active: true,
        }
    }

    fn admin() -> Viewer {
        Viewer::new(Uuid::new_v4(), Role::Admin)
    }

    fn teacher(subjects: &[Uuid]) -> Viewer {
        Viewer::new(
            Uuid::new_v4(),
            Role::Teacher {
                teacher_id: Uuid::new_v4(),
                subjects_taught: subjects.iter().copied().collect(),
            },
        )
    }

    fn student(class_id: Uuid) -> Viewer {
        Viewer::new(
            Uuid::new_v4(),
            Role::Student {
                student_id: Uuid::new_v4(),
                class_id,
            },
        )
    }

    fn ids(list: &[Announcement]) -> Vec<Uuid> {
        list.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_admin_sees_every_live_announcement() {
        let now = Utc::now();
        let mut scoped = announcement(AnnouncementType::Class);
        scoped.target_class_id = Some(Uuid::new_v4());
        let mut subject = announcement(AnnouncementType::Subject);
        subject.target_subject_id = Some(Uuid::new_v4());

        for a in [scoped, subject, announcement(AnnouncementType::Event)] {
            let id = a.id;
            assert_eq!(ids(&resolve(&admin(), vec![a], now)), vec![id]);
        }
    }

    #[test]
    fn test_broadcast_types_reach_every_role() {
        let now = Utc::now();
        let viewers = [admin(), teacher(&[]), student(Uuid::new_v4())];

        for t in [AnnouncementType::General, AnnouncementType::School, AnnouncementType::Event] {
            for viewer in &viewers {
                // Targeted at some unrelated class: the broadcast type still wins.
                let mut a = announcement(t);
                a.target_class_id = Some(Uuid::new_v4());
                assert_eq!(resolve(viewer, vec![a], now).len(), 1, "{:?} / {}", t, viewer.role.name());
            }
        }
    }

    #[test]
    fn test_student_does_not_see_other_class() {
        let mut a = announcement(AnnouncementType::Class);
        a.target_class_id = Some(Uuid::new_v4());

        assert!(resolve(&student(Uuid::new_v4()), vec![a], Utc::now()).is_empty());
    }

    #[test]
    fn test_student_sees_own_class() {
        let class_id = Uuid::new_v4();
        let mut a = announcement(AnnouncementType::Class);
        a.target_class_id = Some(class_id);

        assert_eq!(resolve(&student(class_id), vec![a], Utc::now()).len(), 1);
    }

    #[test]
    fn test_student_sees_any_subject_announcement() {
        let mut a = announcement(AnnouncementType::Subject);
        a.target_subject_id = Some(Uuid::new_v4());
        a.target_class_id = Some(Uuid::new_v4());

        assert_eq!(resolve(&student(Uuid::new_v4()), vec![a], Utc::now()).len(), 1);
    }

    #[test]
    fn test_teacher_sees_own_announcement_outside_their_subjects() {
        let physics = Uuid::new_v4();
        let viewer = teacher(&[physics]);

        let mut a = announcement(AnnouncementType::Subject);
        a.author_id = viewer.id;
        a.target_subject_id = Some(Uuid::new_v4());

        assert_eq!(resolve(&viewer, vec![a], Utc::now()).len(), 1);
    }

    #[test]
    fn test_teacher_subject_mismatch_is_hidden() {
        let math = Uuid::new_v4();
        let physics = Uuid::new_v4();

        let mut a = announcement(AnnouncementType::Subject);
        a.target_subject_id = Some(math);

        assert!(resolve(&teacher(&[physics]), vec![a.clone()], Utc::now()).is_empty());
        assert_eq!(resolve(&teacher(&[math]), vec![a], Utc::now()).len(), 1);
    }

    #[test]
    fn test_teacher_does_not_see_class_scoped_announcement() {
        let mut a = announcement(AnnouncementType::Class);
        a.target_class_id = Some(Uuid::new_v4());

        assert!(resolve(&teacher(&[]), vec![a], Utc::now()).is_empty());
    }

    #[test]
    fn test_untargeted_announcement_is_visible_to_teachers_and_students() {
        let a = announcement(AnnouncementType::Class);
        assert!(a.is_untargeted());

        assert_eq!(resolve(&teacher(&[]), vec![a.clone()], Utc::now()).len(), 1);
        assert_eq!(resolve(&student(Uuid::new_v4()), vec![a], Utc::now()).len(), 1);
    }

    #[test]
    fn test_unrecognized_role_sees_nothing() {
        let viewer = Viewer::new(Uuid::new_v4(), Role::Other);
        let mut own = announcement(AnnouncementType::General);
        own.author_id = viewer.id;

        assert!(resolve(&viewer, vec![own, announcement(AnnouncementType::School)], Utc::now()).is_empty());
    }

    #[test]
    fn test_empty_input() {
        let none: Vec<Announcement> = Vec::new();
        assert!(resolve(&admin(), none, Utc::now()).is_empty());
    }

    #[test]
    fn test_inactive_and_expired_are_dropped() {
        let now = Utc::now();
        let mut inactive = announcement(AnnouncementType::General);
        inactive.is_active = false;
        let mut expired = announcement(AnnouncementType::General);
        expired.expiry_at = Some(now - Duration::hours(1));

        assert!(resolve(&admin(), vec![inactive, expired], now).is_empty());
    }

    #[test]
    fn test_newest_first_with_stable_ties() {
        let now = Utc::now();
        let base = now - Duration::days(3);

        let mut items = Vec::new();
        for offset in [1, 3, 2, 3, 0] {
            let mut a = announcement(AnnouncementType::General);
            a.created_at = base + Duration::hours(offset);
            items.push(a);
        }
        let tie_first = items[1].id;
        let tie_second = items[3].id;

        let result = resolve(&student(Uuid::new_v4()), items, now);

        assert!(result
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
        assert_eq!(result[0].id, tie_first);
        assert_eq!(result[1].id, tie_second);
    }

    #[test]
    fn test_can_open_lets_author_see_inactive() {
        let now = Utc::now();
        let viewer = teacher(&[]);
        let mut a = announcement(AnnouncementType::Subject);
        a.target_subject_id = Some(Uuid::new_v4());
        a.is_active = false;

        assert!(!viewer.can_open(&a, now));
        a.author_id = viewer.id;
        assert!(viewer.can_open(&a, now));
        assert!(admin().can_open(&a, now));
    }
}
