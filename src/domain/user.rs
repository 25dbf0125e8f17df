use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "First Last", falling back to the username when both names are blank.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

/// Which profile gets attached to a newly created account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserKind {
    Admin,
    Teacher {
        #[serde(default)]
        subject_ids: Vec<Uuid>,
        #[serde(default)]
        phone: String,
    },
    Student {
        class_id: Uuid,
        #[serde(default)]
        phone: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub profile: UserKind,
}

fn default_active() -> bool {
    true
}

/// Profile fields an admin may change on an existing account. Only the
/// section matching the user's actual profile is applied.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileUpdate {
    pub phone: Option<String>,
    pub subject_ids: Option<Vec<Uuid>>,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub profile: ProfileUpdate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: "jdoe@example.com".to_string(),
            is_staff: false,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(user("Jane", "Doe").full_name(), "Jane Doe");
        assert_eq!(user("Jane", "").full_name(), "Jane");
        assert_eq!(user("", "").full_name(), "jdoe");
    }

    #[test]
    fn test_create_request_password_confirmation() {
        let request = CreateUserRequest {
            username: "teacher1".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: "t1@example.com".to_string(),
            password: "long-enough-pw".to_string(),
            confirm_password: "different-pw".to_string(),
            is_active: true,
            profile: UserKind::Admin,
        };
        assert!(request.validate().is_err());

        let request = CreateUserRequest {
            confirm_password: "long-enough-pw".to_string(),
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_user_kind_json_shape() {
        let kind: UserKind = serde_json::from_str(
            r#"{"kind":"teacher","subject_ids":[],"phone":"555"}"#,
        )
        .unwrap();
        assert!(matches!(kind, UserKind::Teacher { ref phone, .. } if phone == "555"));
    }
}
