use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub announcement_type: AnnouncementType,
    pub priority: Priority,
    pub author_id: Uuid,
    pub target_class_id: Option<Uuid>,
    pub target_subject_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expiry_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Announcement {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_at.map(|expiry| now > expiry).unwrap_or(false)
    }

    /// Active and not past its expiry.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }

    pub fn is_untargeted(&self) -> bool {
        self.target_class_id.is_none() && self.target_subject_id.is_none()
    }
}

impl AsRef<Announcement> for Announcement {
    fn as_ref(&self) -> &Announcement {
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementType {
    School,
    Class,
    Subject,
    Event,
    General,
}

impl AnnouncementType {
    pub const ALL: [AnnouncementType; 5] = [
        AnnouncementType::School,
        AnnouncementType::Class,
        AnnouncementType::Subject,
        AnnouncementType::Event,
        AnnouncementType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementType::School => "school",
            AnnouncementType::Class => "class",
            AnnouncementType::Subject => "subject",
            AnnouncementType::Event => "event",
            AnnouncementType::General => "general",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s.to_lowercase())
    }

    /// Broadcast categories are visible to every recognized role.
    pub fn is_broadcast(&self) -> bool {
        matches!(
            self,
            AnnouncementType::General | AnnouncementType::School | AnnouncementType::Event
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnnouncementType::School => "School",
            AnnouncementType::Class => "Class",
            AnnouncementType::Subject => "Subject",
            AnnouncementType::Event => "Event",
            AnnouncementType::General => "General",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn css_class(&self) -> String {
        format!("priority-{}", self.as_str())
    }
}

/// Announcement joined with the display labels the portal needs.
#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementDetail {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub author_name: String,
    pub target_class_name: Option<String>,
    pub target_subject_name: Option<String>,
}

impl AsRef<Announcement> for AnnouncementDetail {
    fn as_ref(&self) -> &Announcement {
        &self.announcement
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default = "default_type")]
    pub announcement_type: AnnouncementType,
    #[serde(default)]
    pub priority: Priority,
    pub target_class_id: Option<Uuid>,
    pub target_subject_id: Option<Uuid>,
    pub expiry_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl CreateAnnouncementRequest {
    /// Trims the title so length checks see what gets stored.
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
    }
}

fn default_type() -> AnnouncementType {
    AnnouncementType::General
}

fn default_active() -> bool {
    true
}

/// Partial edit. Clearable fields use `Option<Option<_>>`: absent leaves the
/// value alone, `null` clears it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub announcement_type: Option<AnnouncementType>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "double_option")]
    pub target_class_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub target_subject_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub expiry_at: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

impl UpdateAnnouncementRequest {
    pub fn normalize(&mut self) {
        if let Some(title) = self.title.as_mut() {
            *title = title.trim().to_string();
        }
    }

    pub fn apply(self, announcement: &mut Announcement) {
        if let Some(title) = self.title {
            announcement.title = title;
        }
        if let Some(content) = self.content {
            announcement.content = content;
        }
        if let Some(announcement_type) = self.announcement_type {
            announcement.announcement_type = announcement_type;
        }
        if let Some(priority) = self.priority {
            announcement.priority = priority;
        }
        if let Some(target_class_id) = self.target_class_id {
            announcement.target_class_id = target_class_id;
        }
        if let Some(target_subject_id) = self.target_subject_id {
            announcement.target_subject_id = target_subject_id;
        }
        if let Some(expiry_at) = self.expiry_at {
            announcement.expiry_at = expiry_at;
        }
        if let Some(is_active) = self.is_active {
            announcement.is_active = is_active;
        }
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A teacher's announcement page: what they wrote, and what else reaches them.
#[derive(Debug, Clone, Serialize)]
pub struct TeacherAnnouncements {
    pub own: Vec<AnnouncementDetail>,
    pub relevant: Vec<AnnouncementDetail>,
}

/// Status filter on the admin announcement listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementStatusFilter {
    #[default]
    All,
    Active,
    Expired,
    Inactive,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn announcement(is_active: bool, expiry_at: Option<DateTime<Utc>>) -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            title: "Exam week".to_string(),
            content: "Bring pencils".to_string(),
            announcement_type: AnnouncementType::School,
            priority: Priority::High,
            author_id: Uuid::new_v4(),
            target_class_id: None,
            target_subject_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            expiry_at,
            is_active,
        }
    }

    #[test]
    fn test_liveness() {
        let now = Utc::now();
        assert!(announcement(true, None).is_live(now));
        assert!(announcement(true, Some(now + Duration::days(1))).is_live(now));
        assert!(announcement(true, Some(now)).is_live(now));
        assert!(!announcement(true, Some(now - Duration::seconds(1))).is_live(now));
        assert!(!announcement(false, None).is_live(now));
    }

    #[test]
    fn test_type_parsing() {
        assert_eq!(AnnouncementType::from_str("event"), Some(AnnouncementType::Event));
        assert_eq!(AnnouncementType::from_str("EVENT"), Some(AnnouncementType::Event));
        assert_eq!(AnnouncementType::from_str("memo"), None);
        assert!(AnnouncementType::School.is_broadcast());
        assert!(!AnnouncementType::Subject.is_broadcast());
        assert!(!AnnouncementType::Class.is_broadcast());
    }

    #[test]
    fn test_priority_css_class() {
        assert_eq!(Priority::High.css_class(), "priority-high");
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Priority::from_str("Low"), Some(Priority::Low));
    }

    #[test]
    fn test_update_clears_optional_fields() {
        let mut a = announcement(true, Some(Utc::now()));
        a.target_class_id = Some(Uuid::new_v4());

        let update: UpdateAnnouncementRequest =
            serde_json::from_str(r#"{"target_class_id": null, "title": "Moved"}"#).unwrap();
        update.apply(&mut a);

        assert_eq!(a.title, "Moved");
        assert!(a.target_class_id.is_none());
        // Absent field is left alone.
        assert!(a.expiry_at.is_some());
    }

    #[test]
    fn test_blank_titles_rejected_after_trim() {
        let mut create: CreateAnnouncementRequest =
            serde_json::from_str(r#"{"title": "   ", "content": "Body"}"#).unwrap();
        create.normalize();
        assert!(create.validate().is_err());

        let mut create: CreateAnnouncementRequest =
            serde_json::from_str(r#"{"title": "  Trip  ", "content": "Body"}"#).unwrap();
        create.normalize();
        assert!(create.validate().is_ok());
        assert_eq!(create.title, "Trip");

        let mut update: UpdateAnnouncementRequest =
            serde_json::from_str(r#"{"title": "\t "}"#).unwrap();
        update.normalize();
        assert!(update.validate().is_err());
    }
}
