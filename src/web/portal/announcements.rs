use askama::Template;
use axum::{
    extract::State,
    response::IntoResponse,
    Extension,
};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    error::Result,
    web::templates::{cards, AnnouncementCard, HtmlTemplate, UserInfo},
};

#[derive(Template)]
#[template(path = "portal/announcements.html")]
pub struct AnnouncementsTemplate {
    pub current_user: Option<UserInfo>,
    pub announcements: Vec<AnnouncementCard>,
}

pub async fn announcements_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let visible = state.service_context.announcement_service
        .visible_for(&current.viewer, None)
        .await?;

    Ok(HtmlTemplate(AnnouncementsTemplate {
        current_user: Some(UserInfo::from(&current)),
        announcements: cards(&visible),
    }))
}
