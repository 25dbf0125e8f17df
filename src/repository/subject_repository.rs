use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Subject, SubjectSummary},
    error::{AppError, Result},
    repository::{parse_uuid, SubjectRepository},
};

#[derive(FromRow)]
struct SubjectRow {
    id: String,
    name: String,
    created_at: NaiveDateTime,
    teacher_count: i64,
}

pub struct SqliteSubjectRepository {
    pool: SqlitePool,
}

impl SqliteSubjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_summary(row: SubjectRow) -> Result<SubjectSummary> {
        Ok(SubjectSummary {
            subject: Subject {
                id: parse_uuid(&row.id)?,
                name: row.name,
                created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            },
            teacher_count: row.teacher_count,
        })
    }
}

const SUBJECT_SELECT: &str = r#"
    SELECT s.id, s.name, s.created_at,
           (SELECT COUNT(*) FROM teacher_subjects ts WHERE ts.subject_id = s.id) AS teacher_count
    FROM subjects s
"#;

#[async_trait]
impl SubjectRepository for SqliteSubjectRepository {
    async fn create(&self, name: &str) -> Result<Subject> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO subjects (id, name, created_at) VALUES (?, ?, ?)")
            .bind(id.to_string())
            .bind(name)
            .bind(Utc::now().naive_utc())
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created subject".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subject>> {
        let row = sqlx::query_as::<_, SubjectRow>(
            &format!("{} WHERE s.id = ?", SUBJECT_SELECT)
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::row_to_summary(r).map(|s| s.subject)).transpose()
    }

    async fn list(&self) -> Result<Vec<SubjectSummary>> {
        let rows = sqlx::query_as::<_, SubjectRow>(
            &format!("{} ORDER BY s.name", SUBJECT_SELECT)
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_summary)
            .collect()
    }

    async fn update(&self, id: Uuid, name: &str) -> Result<Subject> {
        sqlx::query("UPDATE subjects SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Subject not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Subject not found".to_string()));
        }

        Ok(())
    }
}
