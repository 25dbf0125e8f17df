use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    http::StatusCode,
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    api::{
        handlers::auth::{end_session, start_session},
        middleware::auth::{current_user, Client},
        state::AppState,
    },
    auth::{csrf::LOGIN_CSRF_COOKIE, LoginCsrf},
    error::AppError,
    web::templates::HtmlTemplate,
};

const DASHBOARD: &str = "/portal/dashboard";

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<super::UserInfo>,
}

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<super::UserInfo>,
    pub username: String,
    pub error: Option<String>,
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Renders the login form with a fresh token and its matching cookie.
fn login_form(
    state: &AppState,
    jar: CookieJar,
    status: StatusCode,
    username: String,
    error: Option<String>,
) -> Response {
    let csrf_token = LoginCsrf::generate_token();
    let jar = jar.add(LoginCsrf::cookie(&csrf_token, state.settings.auth.secure_cookies));
    let template = LoginTemplate {
        current_user: None,
        username,
        error,
        csrf_token,
    };

    (status, jar, HtmlTemplate(template)).into_response()
}

// GET /
pub async fn home(State(state): State<AppState>, jar: CookieJar) -> Response {
    match current_user(&state, &jar).await {
        Ok(Some(_)) => Redirect::to(DASHBOARD).into_response(),
        _ => HtmlTemplate(HomeTemplate { current_user: None }).into_response(),
    }
}

// GET /login
pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Ok(Some(_)) = current_user(&state, &jar).await {
        return Redirect::to(DASHBOARD).into_response();
    }

    login_form(&state, jar, StatusCode::OK, String::new(), None)
}

// POST /login
pub async fn login_handler(
    State(state): State<AppState>,
    Client(client): Client,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let cookie_token = jar.get(LOGIN_CSRF_COOKIE).map(|c| c.value().to_string());
    if !LoginCsrf::verify(cookie_token.as_deref(), &form.csrf_token) {
        tracing::warn!(username = %form.username, "Login form submitted without a valid CSRF token");
        return login_form(
            &state,
            jar,
            StatusCode::FORBIDDEN,
            form.username,
            Some("The login form expired. Please try again.".to_string()),
        );
    }

    match start_session(&state, jar.clone(), &form.username, &form.password, &client).await {
        Ok((jar, _user)) => {
            let jar = jar.add(LoginCsrf::removal_cookie());
            (jar, Redirect::to(DASHBOARD)).into_response()
        }
        Err(AppError::Unauthorized) => login_form(
            &state,
            jar,
            StatusCode::UNAUTHORIZED,
            form.username,
            Some("Invalid username or password".to_string()),
        ),
        Err(e) => e.into_response(),
    }
}

// POST /logout
pub async fn logout_handler(
    State(state): State<AppState>,
    Client(client): Client,
    jar: CookieJar,
) -> impl IntoResponse {
    let jar = end_session(&state, jar, &client).await;
    (jar, Redirect::to("/login"))
}
