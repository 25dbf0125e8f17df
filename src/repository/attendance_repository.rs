use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Attendance, AttendanceMark, AttendanceStatus, Period},
    error::{AppError, Result},
    repository::{parse_opt_uuid, parse_uuid, AttendanceRepository},
};

#[derive(FromRow)]
struct AttendanceRow {
    id: String,
    student_id: String,
    teacher_id: String,
    subject_id: Option<String>,
    date: NaiveDate,
    period: Option<i64>,
    status: String,
    comment: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const ATTENDANCE_COLUMNS: &str = r#"
    id, student_id, teacher_id, subject_id, date, period, status, comment,
    created_at, updated_at
"#;

pub struct SqliteAttendanceRepository {
    pool: SqlitePool,
}

impl SqliteAttendanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_attendance(row: AttendanceRow) -> Result<Attendance> {
        let period = match row.period {
            Some(p) => Some(
                u8::try_from(p)
                    .ok()
                    .and_then(Period::new)
                    .ok_or_else(|| AppError::Database(format!("Invalid period: {}", p)))?,
            ),
            None => None,
        };

        Ok(Attendance {
            id: parse_uuid(&row.id)?,
            student_id: parse_uuid(&row.student_id)?,
            teacher_id: parse_uuid(&row.teacher_id)?,
            subject_id: parse_opt_uuid(row.subject_id)?,
            date: row.date,
            period,
            status: AttendanceStatus::from_str(&row.status).ok_or_else(|| {
                AppError::Database(format!("Invalid attendance status: {}", row.status))
            })?,
            comment: row.comment,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl AttendanceRepository for SqliteAttendanceRepository {
    async fn upsert_many(
        &self,
        teacher_id: Uuid,
        date: NaiveDate,
        subject_id: Option<Uuid>,
        period: Option<Period>,
        marks: &[AttendanceMark],
    ) -> Result<Vec<Attendance>> {
        let subject_str = subject_id.map(|id| id.to_string());
        let period_num = period.map(|p| p.number() as i64);
        let now = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(marks.len());

        for mark in marks {
            // `IS` so an absent subject or period matches an absent one.
            let existing = sqlx::query_scalar::<_, String>(
                r#"
                SELECT id FROM attendance
                WHERE student_id = ? AND date = ? AND subject_id IS ? AND period IS ?
                "#
            )
            .bind(mark.student_id.to_string())
            .bind(date)
            .bind(&subject_str)
            .bind(period_num)
            .fetch_optional(&mut *tx)
            .await?;

            let id = match existing {
                Some(id) => {
                    sqlx::query(
                        r#"
                        UPDATE attendance
                        SET status = ?, comment = ?, teacher_id = ?, updated_at = ?
                        WHERE id = ?
                        "#
                    )
                    .bind(mark.status.as_str())
                    .bind(&mark.comment)
                    .bind(teacher_id.to_string())
                    .bind(now)
                    .bind(&id)
                    .execute(&mut *tx)
                    .await?;
                    id
                }
                None => {
                    let id = Uuid::new_v4().to_string();
                    sqlx::query(
                        &format!(
                            "INSERT INTO attendance ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                            ATTENDANCE_COLUMNS
                        )
                    )
                    .bind(&id)
                    .bind(mark.student_id.to_string())
                    .bind(teacher_id.to_string())
                    .bind(&subject_str)
                    .bind(date)
                    .bind(period_num)
                    .bind(mark.status.as_str())
                    .bind(&mark.comment)
                    .bind(now)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;
                    id
                }
            };

            let row = sqlx::query_as::<_, AttendanceRow>(
                &format!("SELECT {} FROM attendance WHERE id = ?", ATTENDANCE_COLUMNS)
            )
            .bind(&id)
            .fetch_one(&mut *tx)
            .await?;

            saved.push(Self::row_to_attendance(row)?);
        }

        tx.commit().await?;

        Ok(saved)
    }

    async fn find_for(
        &self,
        student_id: Uuid,
        date: NaiveDate,
        subject_id: Option<Uuid>,
        period: Option<Period>,
    ) -> Result<Option<Attendance>> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            &format!(
                "SELECT {} FROM attendance WHERE student_id = ? AND date = ? AND subject_id IS ? AND period IS ?",
                ATTENDANCE_COLUMNS
            )
        )
        .bind(student_id.to_string())
        .bind(date)
        .bind(subject_id.map(|id| id.to_string()))
        .bind(period.map(|p| p.number() as i64))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_attendance).transpose()
    }

    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            &format!(
                "SELECT {} FROM attendance WHERE student_id = ? ORDER BY date DESC, period",
                ATTENDANCE_COLUMNS
            )
        )
        .bind(student_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_attendance)
            .collect()
    }
}
