pub mod auth;

use askama::Template;
use axum::{
    response::{Html, IntoResponse, Response},
    http::StatusCode,
};

use crate::{
    api::middleware::auth::CurrentUser,
    domain::AnnouncementDetail,
};

/// Header data every portal page renders.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub username: String,
    pub full_name: String,
    pub role: String,
}

impl From<&CurrentUser> for UserInfo {
    fn from(current: &CurrentUser) -> Self {
        Self {
            username: current.user.username.clone(),
            full_name: current.user.full_name(),
            role: current.viewer.role.name().to_string(),
        }
    }
}

/// An announcement flattened into display strings.
#[derive(Debug, Clone)]
pub struct AnnouncementCard {
    pub title: String,
    pub content: String,
    pub type_label: String,
    pub priority: String,
    pub priority_class: String,
    pub author: String,
    pub audience: Option<String>,
    pub posted: String,
    pub expires: Option<String>,
}

impl From<&AnnouncementDetail> for AnnouncementCard {
    fn from(detail: &AnnouncementDetail) -> Self {
        let a = &detail.announcement;

        let audience = match (&detail.target_class_name, &detail.target_subject_name) {
            (Some(class), Some(subject)) => Some(format!("{} / {}", class, subject)),
            (Some(class), None) => Some(class.clone()),
            (None, Some(subject)) => Some(subject.clone()),
            (None, None) => None,
        };

        Self {
            title: a.title.clone(),
            content: a.content.clone(),
            type_label: a.announcement_type.label().to_string(),
            priority: a.priority.as_str().to_string(),
            priority_class: a.priority.css_class(),
            author: detail.author_name.clone(),
            audience,
            posted: a.created_at.format("%B %d, %Y").to_string(),
            expires: a.expiry_at.map(|e| e.format("%B %d, %Y %H:%M").to_string()),
        }
    }
}

pub fn cards(announcements: &[AnnouncementDetail]) -> Vec<AnnouncementCard> {
    announcements.iter().map(AnnouncementCard::from).collect()
}

// Make askama templates work with axum
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("Failed to render template: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template: {}", err),
                ).into_response()
            }
        }
    }
}
