use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "name": "Schoolhouse API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "School portal: announcements, timetables, attendance and grades",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/auth/login",
            "announcements": "/api/announcements",
            "teacher": "/api/teacher",
            "student": "/api/student",
            "admin": "/admin"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
