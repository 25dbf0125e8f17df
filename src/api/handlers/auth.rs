use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::{
        middleware::auth::{current_user, Client},
        state::AppState,
    },
    auth::{AuthService, SESSION_COOKIE},
    domain::{ClientInfo, Role, User},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub role: Role,
}

pub async fn login(
    State(state): State<AppState>,
    Client(client): Client,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let (jar, user) = start_session(&state, jar, &req.username, &req.password, &client).await?;
    let viewer = state.service_context.viewer_service.resolve(&user).await?;

    Ok((
        jar,
        Json(LoginResponse {
            user,
            role: viewer.role,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    Client(client): Client,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    let jar = end_session(&state, jar, &client).await;
    Ok((jar, StatusCode::NO_CONTENT))
}

/// Verifies credentials, opens a session and sets its cookie. Shared by the
/// JSON endpoint and the portal login form.
pub async fn start_session(
    state: &AppState,
    jar: CookieJar,
    username: &str,
    password: &str,
    client: &ClientInfo,
) -> Result<(CookieJar, User)> {
    let ctx = &state.service_context;
    let user = ctx.user_service.login(username.trim(), password, client).await?;

    let hours = state.settings.auth.session_duration_hours;
    let (_session, token) = ctx.auth_service.create_session(user.id, hours).await?;
    let cookie = AuthService::create_session_cookie(&token, hours, state.settings.auth.secure_cookies);

    Ok((jar.add(cookie), user))
}

pub async fn end_session(state: &AppState, jar: CookieJar, client: &ClientInfo) -> CookieJar {
    if let Ok(Some(current)) = current_user(state, &jar).await {
        state.service_context.user_service.logout(&current.user, client).await;
    }

    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = state.service_context.auth_service
            .invalidate_session(session_cookie.value())
            .await
        {
            tracing::warn!("Failed to invalidate session: {}", e);
        }
    }

    jar.add(AuthService::create_logout_cookie())
}
