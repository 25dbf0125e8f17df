mod common;

use schoolhouse::{
    domain::{Period, Schedule, ScheduleRequest, Weekday},
    error::AppError,
};
use uuid::Uuid;

use common::{client, create_admin, create_class, create_subject, create_teacher};

fn lesson(class_id: Uuid, subject_id: Uuid, teacher_id: Uuid, day: Weekday, period: u8, room: &str) -> ScheduleRequest {
    ScheduleRequest {
        class_id,
        subject_id,
        teacher_id,
        day,
        period: Period::new(period).unwrap(),
        room: room.to_string(),
        notes: None,
    }
}

#[tokio::test]
async fn test_conflicting_lessons_rejected() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;

    let class_a = create_class(&ctx, &admin, "9A").await?;
    let class_b = create_class(&ctx, &admin, "9B").await?;
    let math = create_subject(&ctx, &admin, "Mathematics").await?;

    let t1_user = create_teacher(&ctx, &admin, "t.one", vec![math.id]).await?;
    let t2_user = create_teacher(&ctx, &admin, "t.two", vec![math.id]).await?;
    let t1 = ctx.profile_repo.find_teacher_by_user(t1_user.id).await?.unwrap();
    let t2 = ctx.profile_repo.find_teacher_by_user(t2_user.id).await?.unwrap();

    let service = &ctx.schedule_service;

    let first = service
        .create(admin.id, lesson(class_a.id, math.id, t1.id, Weekday::Monday, 1, "101"), &client())
        .await?;

    // Same teacher, same slot, different class and room
    let result = service
        .create(admin.id, lesson(class_b.id, math.id, t1.id, Weekday::Monday, 1, "102"), &client())
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // Same room once whitespace is trimmed
    let mut room_clash = lesson(class_b.id, math.id, t2.id, Weekday::Monday, 1, "101");
    room_clash.room = " 101 ".to_string();
    let result = service.create(admin.id, room_clash, &client()).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // Same class
    let result = service
        .create(admin.id, lesson(class_a.id, math.id, t2.id, Weekday::Monday, 1, "102"), &client())
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // Any other slot is free
    service
        .create(admin.id, lesson(class_b.id, math.id, t1.id, Weekday::Monday, 2, "101"), &client())
        .await?;
    service
        .create(admin.id, lesson(class_b.id, math.id, t2.id, Weekday::Monday, 1, "102"), &client())
        .await?;

    // Editing an entry in place does not clash with itself
    let mut moved = lesson(class_a.id, math.id, t1.id, Weekday::Monday, 1, "101");
    moved.notes = Some("Bring calculators".to_string());
    let updated = service.update(admin.id, first.id, moved, &client()).await?;
    assert_eq!(updated.notes.as_deref(), Some("Bring calculators"));

    let timetable = service.class_timetable(class_a.id).await?;
    assert_eq!(timetable.class_name, "9A");
    let monday = timetable.days.iter().find(|d| d.day == Weekday::Monday).unwrap();
    assert!(monday.slots[0].is_some());
    assert!(monday.slots[1].is_none());

    Ok(())
}

#[tokio::test]
async fn test_unknown_references_rejected() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let class = create_class(&ctx, &admin, "9A").await?;
    let math = create_subject(&ctx, &admin, "Mathematics").await?;

    let result = ctx.schedule_service
        .create(admin.id, lesson(class.id, math.id, Uuid::new_v4(), Weekday::Friday, 3, "1"), &client())
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

#[tokio::test]
async fn test_storage_rejects_double_booking() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let class_a = create_class(&ctx, &admin, "9A").await?;
    let class_b = create_class(&ctx, &admin, "9B").await?;
    let math = create_subject(&ctx, &admin, "Mathematics").await?;
    let teacher_user = create_teacher(&ctx, &admin, "t.one", vec![math.id]).await?;
    let teacher = ctx.profile_repo.find_teacher_by_user(teacher_user.id).await?.unwrap();

    let entry = |class_id: Uuid, room: &str| Schedule {
        id: Uuid::new_v4(),
        class_id,
        subject_id: math.id,
        teacher_id: teacher.id,
        day: Weekday::Tuesday,
        period: Period::new(4).unwrap(),
        room: room.to_string(),
        notes: None,
    };

    ctx.schedule_repo.create(entry(class_a.id, "201")).await?;

    // Bypasses the service guard; the unique index still refuses it
    let result = ctx.schedule_repo.create(entry(class_b.id, "202")).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    Ok(())
}

#[tokio::test]
async fn test_teacher_week_rejects_out_of_range_offset() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let math = create_subject(&ctx, &admin, "Mathematics").await?;
    let teacher = create_teacher(&ctx, &admin, "t.math", vec![math.id]).await?;
    let teacher_id = ctx.profile_repo.find_teacher_by_user(teacher.id).await?.unwrap().id;
    let today = chrono::NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();

    let week = ctx.schedule_service.teacher_week(teacher_id, -1, today).await?;
    assert_eq!(week.week_start, chrono::NaiveDate::from_ymd_opt(2024, 4, 29).unwrap());

    for offset in [100_000_000, i64::MAX, i64::MIN] {
        let result = ctx.schedule_service.teacher_week(teacher_id, offset, today).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    Ok(())
}
