mod common;

use schoolhouse::{
    domain::{ActivityQuery, ActivityType, ProfileUpdate, Role, UpdateUserRequest, UserKind},
    error::AppError,
};

use common::{client, create_admin, create_class, create_student, create_subject, create_teacher, user_request, PASSWORD};

#[tokio::test]
async fn test_create_user_attaches_profile() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let class = create_class(&ctx, &admin, "6A").await?;
    let math = create_subject(&ctx, &admin, "Mathematics").await?;

    let teacher = create_teacher(&ctx, &admin, "t.math", vec![math.id]).await?;
    let profile = ctx.profile_repo.find_teacher_by_user(teacher.id).await?.unwrap();
    assert!(profile.teaches(math.id));
    assert!(!teacher.is_staff);

    let student = create_student(&ctx, &admin, "s.one", class.id).await?;
    let profile = ctx.profile_repo.find_student_by_user(student.id).await?.unwrap();
    assert_eq!(profile.class_id, class.id);

    let viewer = ctx.viewer_service.resolve(&student).await?;
    assert!(matches!(viewer.role, Role::Student { class_id, .. } if class_id == class.id));

    // Usernames are unique
    let result = ctx.user_service
        .create_user(admin.id, user_request("s.one", UserKind::Admin), &client())
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // A student profile needs a real class, and nothing is written when it is missing
    let result = ctx.user_service
        .create_user(
            admin.id,
            user_request("s.two", UserKind::Student { class_id: uuid::Uuid::new_v4(), phone: String::new() }),
            &client(),
        )
        .await;
    assert!(result.is_err());
    assert!(ctx.user_repo.find_by_username("s.two").await?.is_none());

    let mut mismatch = user_request("s.three", UserKind::Admin);
    mismatch.confirm_password = "something-else".to_string();
    let result = ctx.user_service.create_user(admin.id, mismatch, &client()).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    assert_eq!(ctx.user_service.list_teachers().await?.len(), 1);
    assert_eq!(ctx.user_service.list_students().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_teacher_profile_wins_over_student_profile() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let class = create_class(&ctx, &admin, "6A").await?;
    let math = create_subject(&ctx, &admin, "Mathematics").await?;
    let teacher = create_teacher(&ctx, &admin, "t.math", vec![math.id]).await?;

    sqlx::query("INSERT INTO students (id, user_id, class_id, phone) VALUES (?, ?, ?, '')")
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(teacher.id.to_string())
        .bind(class.id.to_string())
        .execute(&ctx.db_pool)
        .await?;
    assert!(ctx.profile_repo.find_student_by_user(teacher.id).await?.is_some());

    let viewer = ctx.viewer_service.resolve(&teacher).await?;
    match viewer.role {
        Role::Teacher { subjects_taught, .. } => assert!(subjects_taught.contains(&math.id)),
        other => panic!("expected a teacher role, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_login_and_deactivation() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let class = create_class(&ctx, &admin, "6A").await?;
    let student = create_student(&ctx, &admin, "s.one", class.id).await?;

    let result = ctx.user_service.login("s.one", "wrong-password", &client()).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));

    let user = ctx.user_service.login("s.one", PASSWORD, &client()).await?;
    assert_eq!(user.id, student.id);
    let refreshed = ctx.user_repo.find_by_id(student.id).await?.unwrap();
    assert!(refreshed.last_login_at.is_some());

    let (_, token) = ctx.auth_service.create_session(student.id, 24).await?;
    assert!(ctx.auth_service.validate_session(&token).await?.is_some());

    // Deactivation drops sessions and blocks further logins
    let toggled = ctx.user_service.toggle_active(admin.id, student.id, &client()).await?;
    assert!(!toggled.is_active);
    assert!(ctx.auth_service.validate_session(&token).await?.is_none());

    let result = ctx.user_service.login("s.one", PASSWORD, &client()).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));

    let logins = ctx.activity_service
        .search(&ActivityQuery { activity_type: Some(ActivityType::UserLogin), ..Default::default() }, 20)
        .await?;
    assert_eq!(logins.total, 1);

    Ok(())
}

#[tokio::test]
async fn test_admin_cannot_remove_themself() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;

    let result = ctx.user_service.delete_user(admin.id, admin.id, &client()).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let result = ctx.user_service.toggle_active(admin.id, admin.id, &client()).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let deactivate = UpdateUserRequest {
        is_active: Some(false),
        ..Default::default()
    };
    let result = ctx.user_service.update_user(admin.id, admin.id, deactivate, &client()).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

#[tokio::test]
async fn test_update_moves_student_between_classes() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let class_a = create_class(&ctx, &admin, "6A").await?;
    let class_b = create_class(&ctx, &admin, "6B").await?;
    let student = create_student(&ctx, &admin, "s.one", class_a.id).await?;

    let update = UpdateUserRequest {
        first_name: Some("Renamed".to_string()),
        profile: ProfileUpdate {
            class_id: Some(class_b.id),
            ..Default::default()
        },
        ..Default::default()
    };
    let user = ctx.user_service.update_user(admin.id, student.id, update, &client()).await?;
    assert_eq!(user.first_name, "Renamed");

    let profile = ctx.profile_repo.find_student_by_user(student.id).await?.unwrap();
    assert_eq!(profile.class_id, class_b.id);

    let short = UpdateUserRequest {
        password: Some("short".to_string()),
        confirm_password: Some("short".to_string()),
        ..Default::default()
    };
    let result = ctx.user_service.update_user(admin.id, student.id, short, &client()).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    Ok(())
}

#[tokio::test]
async fn test_activity_search_pages() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;

    for i in 0..7 {
        create_class(&ctx, &admin, &format!("Class {}", i)).await?;
    }

    let query = ActivityQuery {
        activity_type: Some(ActivityType::ClassCreated),
        page: Some(2),
        ..Default::default()
    };
    let page = ctx.activity_service.search(&query, 3).await?;
    assert_eq!(page.total, 7);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.page, 2);
    assert_eq!(page.activities.len(), 3);

    // Out of range pages clamp to the last one
    let query = ActivityQuery { page: Some(99), ..query };
    let page = ctx.activity_service.search(&query, 3).await?;
    assert_eq!(page.page, 3);
    assert_eq!(page.activities.len(), 1);

    let query = ActivityQuery {
        search: Some("Class 4".to_string()),
        ..Default::default()
    };
    let page = ctx.activity_service.search(&query, 20).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.activities[0].username.as_deref(), Some("admin"));

    Ok(())
}
