mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use schoolhouse::{api::create_app, config::Settings, domain::{AnnouncementType, CreateAnnouncementRequest, Priority}};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{client, create_admin, create_class, create_student, PASSWORD};

async fn login(app: &Router, username: &str) -> anyhow::Result<String> {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "username": username, "password": PASSWORD }).to_string()))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("login did not set a session cookie"))?;

    Ok(cookie)
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let response = app.clone().oneshot(builder.body(Body::empty())?).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };

    Ok((status, body))
}

#[tokio::test]
async fn test_session_flow_and_role_guards() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let class = create_class(&ctx, &admin, "4A").await?;
    create_student(&ctx, &admin, "pupil", class.id).await?;

    let admin_v = ctx.viewer_service.resolve(&admin).await?;
    ctx.announcement_service.create(&admin_v, CreateAnnouncementRequest {
        title: "Snow day".to_string(),
        content: "School is closed tomorrow.".to_string(),
        announcement_type: AnnouncementType::School,
        priority: Priority::High,
        target_class_id: None,
        target_subject_id: None,
        expiry_at: None,
        is_active: true,
    }, &client()).await?;

    let app = create_app(Arc::new(ctx), Arc::new(Settings::default()));

    let (status, _) = get(&app, "/api/announcements", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let cookie = login(&app, "pupil").await?;

    let (status, body) = get(&app, "/api/announcements", Some(&cookie)).await?;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().cloned().unwrap_or_default();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Snow day");
    assert_eq!(items[0]["priority"], "high");

    let (status, _) = get(&app, "/api/student/schedule", Some(&cookie)).await?;
    assert_eq!(status, StatusCode::OK);

    // Students are kept out of teacher and admin routes
    let (status, _) = get(&app, "/api/teacher/schedule", Some(&cookie)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = get(&app, "/admin/dashboard", Some(&cookie)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_cookie = login(&app, "admin").await?;
    let (status, body) = get(&app, "/admin/dashboard", Some(&admin_cookie)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["students_count"], 1);

    let (status, _) = get(&app, "/admin/announcements?status=stale", Some(&admin_cookie)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_bad_credentials_rejected() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    create_admin(&ctx, "admin").await?;
    let app = create_app(Arc::new(ctx), Arc::new(Settings::default()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "username": "admin", "password": "nope" }).to_string()))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_portal_redirects_anonymous_visitors() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let app = create_app(Arc::new(ctx), Arc::new(Settings::default()));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/portal/dashboard").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let (status, _) = get(&app, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

fn form_login(cookie: Option<&str>, token: &str) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    Ok(builder.body(Body::from(format!(
        "username=admin&password={}&csrf_token={}",
        PASSWORD, token
    )))?)
}

#[tokio::test]
async fn test_login_form_requires_csrf_token() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    create_admin(&ctx, "admin").await?;
    let app = create_app(Arc::new(ctx), Arc::new(Settings::default()));

    // Cross-site post: no cookie, guessed token
    let response = app.clone().oneshot(form_login(None, "forged")?).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/login").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("login page did not set a csrf cookie"))?;
    let html = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await?.to_vec())?;
    let token = html
        .split("name=\"csrf_token\" value=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .ok_or_else(|| anyhow::anyhow!("login page has no csrf field"))?
        .to_string();

    let response = app.clone().oneshot(form_login(Some(&cookie), "forged")?).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.oneshot(form_login(Some(&cookie), &token)?).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/portal/dashboard");

    Ok(())
}
