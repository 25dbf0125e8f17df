use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{
        middleware::auth::{Client, CurrentUser},
        state::AppState,
    },
    domain::{Announcement, AnnouncementDetail, CreateAnnouncementRequest, UpdateAnnouncementRequest},
    error::Result,
};

const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ListAnnouncementsQuery {
    pub limit: Option<usize>,
}

/// Announcements visible to the caller, newest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListAnnouncementsQuery>,
) -> Result<Json<Vec<AnnouncementDetail>>> {
    let limit = params.limit.map(|l| l.min(MAX_LIMIT));

    let announcements = state.service_context.announcement_service
        .visible_for(&current.viewer, limit)
        .await?;

    Ok(Json(announcements))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnnouncementDetail>> {
    let announcement = state.service_context.announcement_service
        .get_for(&current.viewer, id)
        .await?;

    Ok(Json(announcement))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Json(request): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>)> {
    let created = state.service_context.announcement_service
        .create(&current.viewer, request, &client)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAnnouncementRequest>,
) -> Result<Json<Announcement>> {
    let updated = state.service_context.announcement_service
        .update(&current.viewer, id, request, &client)
        .await?;

    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Client(client): Client,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.announcement_service
        .delete(&current.viewer, id, &client)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
