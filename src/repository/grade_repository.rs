use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Grade, GradeEntry, RecordGradeRequest},
    error::Result,
    repository::{parse_uuid, GradeRepository},
};

#[derive(FromRow)]
struct GradeRow {
    id: String,
    student_id: String,
    subject_id: String,
    quarter_grade: Option<i32>,
    yearly_grade: Option<i32>,
    average_score: f64,
    date: NaiveDate,
    subject_name: String,
}

pub struct SqliteGradeRepository {
    pool: SqlitePool,
}

impl SqliteGradeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: GradeRow) -> Result<GradeEntry> {
        Ok(GradeEntry {
            grade: Grade {
                id: parse_uuid(&row.id)?,
                student_id: parse_uuid(&row.student_id)?,
                subject_id: parse_uuid(&row.subject_id)?,
                quarter_grade: row.quarter_grade,
                yearly_grade: row.yearly_grade,
                average_score: row.average_score,
                date: row.date,
            },
            subject_name: row.subject_name,
        })
    }
}

#[async_trait]
impl GradeRepository for SqliteGradeRepository {
    async fn record(&self, request: RecordGradeRequest, date: NaiveDate) -> Result<Grade> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO grades (id, student_id, subject_id, quarter_grade, yearly_grade, average_score, date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(request.student_id.to_string())
        .bind(request.subject_id.to_string())
        .bind(request.quarter_grade)
        .bind(request.yearly_grade)
        .bind(request.average_score)
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(Grade {
            id,
            student_id: request.student_id,
            subject_id: request.subject_id,
            quarter_grade: request.quarter_grade,
            yearly_grade: request.yearly_grade,
            average_score: request.average_score,
            date,
        })
    }

    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<GradeEntry>> {
        let rows = sqlx::query_as::<_, GradeRow>(
            r#"
            SELECT g.id, g.student_id, g.subject_id, g.quarter_grade, g.yearly_grade,
                   g.average_score, g.date, s.name AS subject_name
            FROM grades g
            JOIN subjects s ON s.id = g.subject_id
            WHERE g.student_id = ?
            ORDER BY g.date DESC, s.name
            "#
        )
        .bind(student_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_entry)
            .collect()
    }
}
