use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{ClassSummary, SchoolClass},
    error::{AppError, Result},
    repository::{parse_uuid, ClassRepository},
};

#[derive(FromRow)]
struct ClassRow {
    id: String,
    name: String,
    created_at: NaiveDateTime,
}

#[derive(FromRow)]
struct ClassSummaryRow {
    id: String,
    name: String,
    created_at: NaiveDateTime,
    student_count: i64,
}

pub struct SqliteClassRepository {
    pool: SqlitePool,
}

impl SqliteClassRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_class(row: ClassRow) -> Result<SchoolClass> {
        Ok(SchoolClass {
            id: parse_uuid(&row.id)?,
            name: row.name,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl ClassRepository for SqliteClassRepository {
    async fn create(&self, name: &str) -> Result<SchoolClass> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO classes (id, name, created_at) VALUES (?, ?, ?)")
            .bind(id.to_string())
            .bind(name)
            .bind(Utc::now().naive_utc())
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created class".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SchoolClass>> {
        let row = sqlx::query_as::<_, ClassRow>(
            "SELECT id, name, created_at FROM classes WHERE id = ?"
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_class).transpose()
    }

    async fn list(&self) -> Result<Vec<ClassSummary>> {
        let rows = sqlx::query_as::<_, ClassSummaryRow>(
            r#"
            SELECT c.id, c.name, c.created_at,
                   (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id) AS student_count
            FROM classes c
            ORDER BY c.name
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ClassSummary {
                    class: Self::row_to_class(ClassRow {
                        id: row.id,
                        name: row.name,
                        created_at: row.created_at,
                    })?,
                    student_count: row.student_count,
                })
            })
            .collect()
    }

    async fn update(&self, id: Uuid, name: &str) -> Result<SchoolClass> {
        sqlx::query("UPDATE classes SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Class not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM classes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Class not found".to_string()));
        }

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
