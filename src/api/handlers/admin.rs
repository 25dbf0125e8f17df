use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{
        middleware::auth::{Client, CurrentUser},
        state::AppState,
    },
    domain::*,
    error::{AppError, Result},
};

#[derive(Debug, Serialize)]
pub struct UsersOverview {
    pub users: Vec<User>,
    pub teachers: Vec<TeacherListing>,
    pub students: Vec<StudentListing>,
}

#[derive(Debug, Deserialize)]
pub struct AnnouncementFilterQuery {
    #[serde(rename = "type")]
    pub announcement_type: Option<String>,
    pub status: Option<String>,
}

impl AnnouncementFilterQuery {
    fn parse(&self) -> Result<(Option<AnnouncementType>, AnnouncementStatusFilter)> {
        let announcement_type = match self.announcement_type.as_deref().filter(|t| !t.is_empty()) {
            Some(t) => Some(AnnouncementType::from_str(t).ok_or_else(|| {
                AppError::BadRequest(format!("Unknown announcement type: {}", t))
            })?),
            None => None,
        };

        let status = match self.status.as_deref().unwrap_or("").to_lowercase().as_str() {
            "" | "all" => AnnouncementStatusFilter::All,
            "active" => AnnouncementStatusFilter::Active,
            "expired" => AnnouncementStatusFilter::Expired,
            "inactive" => AnnouncementStatusFilter::Inactive,
            other => return Err(AppError::BadRequest(format!("Unknown status filter: {}", other))),
        };

        Ok((announcement_type, status))
    }
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    let stats = state.service_context.user_service.dashboard_stats().await?;
    Ok(Json(stats))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersOverview>> {
    let service = &state.service_context.user_service;

    Ok(Json(UsersOverview {
        users: service.list_users().await?,
        teachers: service.list_teachers().await?,
        students: service.list_students().await?,
    }))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.service_context.user_service
        .create_user(current.user.id, request, &client)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let user = state.service_context.user_service
        .update_user(current.user.id, id, request, &client)
        .await?;

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.user_service
        .delete_user(current.user.id, id, &client)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_user_active(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Path(id): Path<Uuid>,
) -> Result<Json<User>> {
    let user = state.service_context.user_service
        .toggle_active(current.user.id, id, &client)
        .await?;

    Ok(Json(user))
}

pub async fn list_classes(State(state): State<AppState>) -> Result<Json<Vec<ClassSummary>>> {
    Ok(Json(state.service_context.user_service.list_classes().await?))
}

pub async fn create_class(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Json(request): Json<NameRequest>,
) -> Result<(StatusCode, Json<SchoolClass>)> {
    let class = state.service_context.user_service
        .create_class(current.user.id, request, &client)
        .await?;

    Ok((StatusCode::CREATED, Json(class)))
}

pub async fn update_class(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Path(id): Path<Uuid>,
    Json(request): Json<NameRequest>,
) -> Result<Json<SchoolClass>> {
    let class = state.service_context.user_service
        .update_class(current.user.id, id, request, &client)
        .await?;

    Ok(Json(class))
}

pub async fn delete_class(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.user_service
        .delete_class(current.user.id, id, &client)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<SubjectSummary>>> {
    Ok(Json(state.service_context.user_service.list_subjects().await?))
}

pub async fn create_subject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Json(request): Json<NameRequest>,
) -> Result<(StatusCode, Json<Subject>)> {
    let subject = state.service_context.user_service
        .create_subject(current.user.id, request, &client)
        .await?;

    Ok((StatusCode::CREATED, Json(subject)))
}

pub async fn update_subject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Path(id): Path<Uuid>,
    Json(request): Json<NameRequest>,
) -> Result<Json<Subject>> {
    let subject = state.service_context.user_service
        .update_subject(current.user.id, id, request, &client)
        .await?;

    Ok(Json(subject))
}

pub async fn delete_subject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.user_service
        .delete_subject(current.user.id, id, &client)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Json(request): Json<ScheduleRequest>,
) -> Result<(StatusCode, Json<Schedule>)> {
    let schedule = state.service_context.schedule_service
        .create(current.user.id, request, &client)
        .await?;

    Ok((StatusCode::CREATED, Json(schedule)))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Path(id): Path<Uuid>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<Schedule>> {
    let schedule = state.service_context.schedule_service
        .update(current.user.id, id, request, &client)
        .await?;

    Ok(Json(schedule))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.schedule_service
        .delete(current.user.id, id, &client)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn class_schedule(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<Json<ClassTimetable>> {
    let timetable = state.service_context.schedule_service
        .class_timetable(class_id)
        .await?;

    Ok(Json(timetable))
}

pub async fn list_announcements(
    State(state): State<AppState>,
    Query(params): Query<AnnouncementFilterQuery>,
) -> Result<Json<Vec<AnnouncementDetail>>> {
    let (announcement_type, status) = params.parse()?;

    let announcements = state.service_context.announcement_service
        .admin_list(announcement_type, status)
        .await?;

    Ok(Json(announcements))
}

pub async fn activities(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityPage>> {
    let page = state.service_context.activity_service
        .search(&query, state.settings.portal.page_size)
        .await?;

    Ok(Json(page))
}
