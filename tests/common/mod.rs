#![allow(dead_code)]

use schoolhouse::{
    domain::{ClientInfo, CreateUserRequest, NameRequest, SchoolClass, Subject, User, UserKind},
    repository::NewUser,
    service::ServiceContext,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub const PASSWORD: &str = "password123";

/// A single-connection in-memory database, so every query sees the same data.
pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}

pub async fn test_context() -> anyhow::Result<ServiceContext> {
    Ok(ServiceContext::new(test_pool().await?))
}

pub fn client() -> ClientInfo {
    ClientInfo {
        ip_address: Some("127.0.0.1".to_string()),
        user_agent: "integration-test".to_string(),
    }
}

pub async fn create_admin(ctx: &ServiceContext, username: &str) -> anyhow::Result<User> {
    let user = ctx.user_repo.create(
        NewUser {
            username: username.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Admin".to_string(),
            email: format!("{}@example.com", username),
            password: PASSWORD.to_string(),
            is_staff: true,
            is_active: true,
        },
        &UserKind::Admin,
    ).await?;

    Ok(user)
}

pub fn user_request(username: &str, profile: UserKind) -> CreateUserRequest {
    CreateUserRequest {
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: username.to_string(),
        email: format!("{}@example.com", username),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
        is_active: true,
        profile,
    }
}

pub async fn create_class(ctx: &ServiceContext, admin: &User, name: &str) -> anyhow::Result<SchoolClass> {
    Ok(ctx.user_service
        .create_class(admin.id, NameRequest { name: name.to_string() }, &client())
        .await?)
}

pub async fn create_subject(ctx: &ServiceContext, admin: &User, name: &str) -> anyhow::Result<Subject> {
    Ok(ctx.user_service
        .create_subject(admin.id, NameRequest { name: name.to_string() }, &client())
        .await?)
}

pub async fn create_teacher(
    ctx: &ServiceContext,
    admin: &User,
    username: &str,
    subject_ids: Vec<uuid::Uuid>,
) -> anyhow::Result<User> {
    Ok(ctx.user_service
        .create_user(
            admin.id,
            user_request(username, UserKind::Teacher { subject_ids, phone: String::new() }),
            &client(),
        )
        .await?)
}

pub async fn create_student(
    ctx: &ServiceContext,
    admin: &User,
    username: &str,
    class_id: uuid::Uuid,
) -> anyhow::Result<User> {
    Ok(ctx.user_service
        .create_user(
            admin.id,
            user_request(username, UserKind::Student { class_id, phone: String::new() }),
            &client(),
        )
        .await?)
}
