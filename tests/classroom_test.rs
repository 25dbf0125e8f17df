mod common;

use chrono::NaiveDate;
use schoolhouse::{
    domain::{AttendanceMark, AttendanceStatus, Period, RecordGradeRequest, SaveAttendanceRequest},
    error::AppError,
};
use uuid::Uuid;

use common::{client, create_admin, create_class, create_student, create_subject, create_teacher};

#[tokio::test]
async fn test_attendance_resave_overwrites() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let class = create_class(&ctx, &admin, "5A").await?;
    let math = create_subject(&ctx, &admin, "Mathematics").await?;
    let teacher = create_teacher(&ctx, &admin, "t.math", vec![math.id]).await?;
    let anna = create_student(&ctx, &admin, "anna", class.id).await?;
    let ben = create_student(&ctx, &admin, "ben", class.id).await?;

    let teacher_v = ctx.viewer_service.resolve(&teacher).await?;
    let anna_id = ctx.profile_repo.find_student_by_user(anna.id).await?.unwrap().id;
    let ben_id = ctx.profile_repo.find_student_by_user(ben.id).await?.unwrap().id;
    let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();

    // No subject or period: the key still has to collide on re-save
    let save = |status: AttendanceStatus| SaveAttendanceRequest {
        date,
        subject_id: None,
        period: None,
        marks: vec![
            AttendanceMark { student_id: anna_id, status, comment: String::new() },
            AttendanceMark { student_id: Uuid::new_v4(), status, comment: String::new() },
        ],
    };

    let result = ctx.attendance_service.save(&teacher_v, save(AttendanceStatus::AbsentWithReason), &client()).await?;
    assert_eq!(result.saved_count, 1);
    assert_eq!(result.skipped.len(), 1);

    ctx.attendance_service.save(&teacher_v, save(AttendanceStatus::AbsentWithoutReason), &client()).await?;

    let records = ctx.attendance_service.for_student(anna_id).await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttendanceStatus::AbsentWithoutReason);

    let sheet = ctx.attendance_service.roster(class.id, date, None, None).await?;
    assert_eq!(sheet.roster.len(), 2);
    let ben_row = sheet.roster.iter().find(|r| r.student_id == ben_id).unwrap();
    assert_eq!(ben_row.status, AttendanceStatus::Present);
    assert!(ben_row.last_updated.is_none());
    assert_eq!(sheet.summary.present, 1);
    assert_eq!(sheet.summary.absent_without_reason, 1);

    // A different period is a separate mark
    let period_sheet = ctx.attendance_service
        .roster(class.id, date, Some(math.id), Period::new(2))
        .await?;
    assert!(period_sheet.roster.iter().all(|r| r.status == AttendanceStatus::Present));

    let missing = ctx.attendance_service.roster(Uuid::new_v4(), date, None, None).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_attendance_with_unknown_subject_rejected() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let class = create_class(&ctx, &admin, "5A").await?;
    let math = create_subject(&ctx, &admin, "Mathematics").await?;
    let teacher = create_teacher(&ctx, &admin, "t.math", vec![math.id]).await?;
    let anna = create_student(&ctx, &admin, "anna", class.id).await?;

    let teacher_v = ctx.viewer_service.resolve(&teacher).await?;
    let anna_id = ctx.profile_repo.find_student_by_user(anna.id).await?.unwrap().id;
    let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

    let request = SaveAttendanceRequest {
        date,
        subject_id: Some(Uuid::new_v4()),
        period: Period::new(1),
        marks: vec![AttendanceMark {
            student_id: anna_id,
            status: AttendanceStatus::AbsentWithReason,
            comment: String::new(),
        }],
    };

    let result = ctx.attendance_service.save(&teacher_v, request, &client()).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert!(ctx.attendance_service.for_student(anna_id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_grades_only_for_taught_subjects() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let class = create_class(&ctx, &admin, "5A").await?;
    let math = create_subject(&ctx, &admin, "Mathematics").await?;
    let art = create_subject(&ctx, &admin, "Art").await?;
    let teacher = create_teacher(&ctx, &admin, "t.math", vec![math.id]).await?;
    let student = create_student(&ctx, &admin, "anna", class.id).await?;

    let teacher_v = ctx.viewer_service.resolve(&teacher).await?;
    let student_id = ctx.profile_repo.find_student_by_user(student.id).await?.unwrap().id;

    let grade = |subject_id: Uuid| RecordGradeRequest {
        student_id,
        subject_id,
        quarter_grade: Some(5),
        yearly_grade: None,
        average_score: 4.6,
    };

    ctx.grade_service.record(&teacher_v, grade(math.id), &client()).await?;

    let result = ctx.grade_service.record(&teacher_v, grade(art.id), &client()).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let mut out_of_range = grade(math.id);
    out_of_range.quarter_grade = Some(9);
    let result = ctx.grade_service.record(&teacher_v, out_of_range, &client()).await;
    assert!(result.is_err());

    let grades = ctx.grade_service.for_student(student_id).await?;
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0].subject_name, "Mathematics");
    assert_eq!(grades[0].grade.quarter_grade, Some(5));

    Ok(())
}
