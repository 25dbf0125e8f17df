use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Utc;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{DashboardStats, DayLessons, Role, TeacherWeek},
    error::Result,
    web::templates::{cards, AnnouncementCard, HtmlTemplate, UserInfo},
};

#[derive(Template)]
#[template(path = "portal/admin.html")]
pub struct AdminDashboardTemplate {
    pub current_user: Option<UserInfo>,
    pub stats: DashboardStats,
    pub activities: Vec<ActivityRow>,
    pub announcements: Vec<AnnouncementCard>,
}

#[derive(Template)]
#[template(path = "portal/teacher.html")]
pub struct TeacherDashboardTemplate {
    pub current_user: Option<UserInfo>,
    pub week: TeacherWeek,
    pub announcements: Vec<AnnouncementCard>,
}

#[derive(Template)]
#[template(path = "portal/student.html")]
pub struct StudentDashboardTemplate {
    pub current_user: Option<UserInfo>,
    pub days: Vec<DayLessons>,
    pub announcements: Vec<AnnouncementCard>,
}

#[derive(Template)]
#[template(path = "portal/other.html")]
pub struct OtherDashboardTemplate {
    pub current_user: Option<UserInfo>,
}

pub struct ActivityRow {
    pub when: String,
    pub who: String,
    pub kind: String,
    pub description: String,
}

/// One dashboard per role, each showing the newest announcements the caller
/// is allowed to see.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response> {
    let ctx = &state.service_context;
    let user_info = Some(UserInfo::from(&current));

    let recent = ctx.announcement_service
        .visible_for(&current.viewer, Some(state.settings.portal.recent_announcements))
        .await?;
    let announcements = cards(&recent);

    let response = match &current.viewer.role {
        Role::Admin => {
            let stats = ctx.user_service.dashboard_stats().await?;
            let activities = stats.recent_activities.iter()
                .map(|a| ActivityRow {
                    when: a.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    who: a.username.clone().unwrap_or_else(|| "system".to_string()),
                    kind: a.activity_type.as_str().replace('_', " "),
                    description: a.description.clone(),
                })
                .collect();

            HtmlTemplate(AdminDashboardTemplate {
                current_user: user_info,
                stats,
                activities,
                announcements,
            })
            .into_response()
        }
        Role::Teacher { teacher_id, .. } => {
            let week = ctx.schedule_service
                .teacher_week(*teacher_id, 0, Utc::now().date_naive())
                .await?;

            HtmlTemplate(TeacherDashboardTemplate {
                current_user: user_info,
                week,
                announcements,
            })
            .into_response()
        }
        Role::Student { class_id, .. } => {
            let days = ctx.schedule_service.student_week(*class_id).await?;

            HtmlTemplate(StudentDashboardTemplate {
                current_user: user_info,
                days,
                announcements,
            })
            .into_response()
        }
        Role::Other => HtmlTemplate(OtherDashboardTemplate { current_user: user_info }).into_response(),
    };

    Ok(response)
}
