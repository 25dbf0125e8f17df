use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::SESSION_COOKIE,
    domain::{ClientInfo, Role, User, Viewer},
    error::AppError,
    service::client_info,
};

/// The authenticated account and its resolved role, inserted into request
/// extensions by the middleware below.
#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
    pub viewer: Viewer,
}

/// Looks up the session cookie. `None` for a missing, expired or unknown
/// session, or an account that has since been deactivated.
pub async fn current_user(state: &AppState, jar: &CookieJar) -> Result<Option<CurrentUser>, AppError> {
    let Some(session_cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let ctx = &state.service_context;
    let Some(session) = ctx.auth_service.validate_session(session_cookie.value()).await? else {
        return Ok(None);
    };

    let user = match ctx.user_repo.find_by_id(session.user_id).await? {
        Some(user) if user.is_active => user,
        _ => return Ok(None),
    };

    let viewer = ctx.viewer_service.resolve(&user).await?;

    Ok(Some(CurrentUser { user, viewer }))
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current = current_user(&state, &jar).await?.ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

/// Portal pages send anonymous visitors to the login form instead of a 401.
pub async fn require_auth_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&state, &jar).await {
        Ok(Some(current)) => {
            request.extensions_mut().insert(current);
            next.run(request).await
        }
        Ok(None) => Redirect::to("/login").into_response(),
        Err(e) => e.into_response(),
    }
}

async fn require_role(
    state: AppState,
    jar: CookieJar,
    mut request: Request,
    next: Next,
    allowed: fn(&Role) -> bool,
) -> Result<Response, AppError> {
    let current = current_user(&state, &jar).await?.ok_or(AppError::Unauthorized)?;

    if !allowed(&current.viewer.role) {
        tracing::debug!(
            user_id = %current.user.id,
            role = current.viewer.role.name(),
            path = %request.uri().path(),
            "Role check failed"
        );
        return Err(AppError::forbidden());
    }

    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(state, jar, request, next, |role| matches!(role, Role::Admin)).await
}

pub async fn require_teacher(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(state, jar, request, next, |role| matches!(role, Role::Teacher { .. })).await
}

pub async fn require_student(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(state, jar, request, next, |role| matches!(role, Role::Student { .. })).await
}

/// Request origin for the activity log.
pub struct Client(pub ClientInfo);

#[async_trait]
impl<S> FromRequestParts<S> for Client
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded_for = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok());
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Client(client_info(forwarded_for, peer, user_agent)))
    }
}
