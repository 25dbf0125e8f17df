use axum::{
    extract::State,
    Json,
    Extension,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{AnnouncementDetail, Attendance, DayLessons, GradeEntry, Role},
    error::{AppError, Result},
};

fn student_ids(current: &CurrentUser) -> Result<(Uuid, Uuid)> {
    match current.viewer.role {
        Role::Student { student_id, class_id } => Ok((student_id, class_id)),
        _ => Err(AppError::forbidden()),
    }
}

/// The caller's class timetable grouped by weekday.
pub async fn schedule(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<DayLessons>>> {
    let (_, class_id) = student_ids(&current)?;

    let week = state.service_context.schedule_service
        .student_week(class_id)
        .await?;

    Ok(Json(week))
}

pub async fn attendance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Attendance>>> {
    let (student_id, _) = student_ids(&current)?;

    let records = state.service_context.attendance_service
        .for_student(student_id)
        .await?;

    Ok(Json(records))
}

pub async fn grades(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<GradeEntry>>> {
    let (student_id, _) = student_ids(&current)?;

    let grades = state.service_context.grade_service
        .for_student(student_id)
        .await?;

    Ok(Json(grades))
}

pub async fn announcements(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<AnnouncementDetail>>> {
    let announcements = state.service_context.announcement_service
        .visible_for(&current.viewer, None)
        .await?;

    Ok(Json(announcements))
}
