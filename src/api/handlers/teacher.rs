use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
    Extension,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{
        middleware::auth::{Client, CurrentUser},
        state::AppState,
    },
    domain::{
        AttendanceSheet, Grade, Period, RecordGradeRequest, SaveAttendanceRequest,
        SaveAttendanceResult, TeacherAnnouncements, TeacherWeek,
    },
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    #[serde(default)]
    pub week: i64,
}

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub class_id: Uuid,
    pub date: Option<NaiveDate>,
    pub subject_id: Option<Uuid>,
    pub period: Option<Period>,
}

fn teacher_id(current: &CurrentUser) -> Result<Uuid> {
    current.viewer.teacher_id().ok_or_else(AppError::forbidden)
}

/// The caller's lessons for the week `week` weeks from now.
pub async fn schedule(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<WeekQuery>,
) -> Result<Json<TeacherWeek>> {
    let week = state.service_context.schedule_service
        .teacher_week(teacher_id(&current)?, params.week, Utc::now().date_naive())
        .await?;

    Ok(Json(week))
}

pub async fn attendance_sheet(
    State(state): State<AppState>,
    Query(params): Query<RosterQuery>,
) -> Result<Json<AttendanceSheet>> {
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());

    let sheet = state.service_context.attendance_service
        .roster(params.class_id, date, params.subject_id, params.period)
        .await?;

    Ok(Json(sheet))
}

pub async fn save_attendance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Json(request): Json<SaveAttendanceRequest>,
) -> Result<Json<SaveAttendanceResult>> {
    let result = state.service_context.attendance_service
        .save(&current.viewer, request, &client)
        .await?;

    Ok(Json(result))
}

pub async fn announcements(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<TeacherAnnouncements>> {
    let overview = state.service_context.announcement_service
        .teacher_overview(&current.viewer)
        .await?;

    Ok(Json(overview))
}

pub async fn record_grade(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Json(request): Json<RecordGradeRequest>,
) -> Result<(StatusCode, Json<Grade>)> {
    let grade = state.service_context.grade_service
        .record(&current.viewer, request, &client)
        .await?;

    Ok((StatusCode::CREATED, Json(grade)))
}
