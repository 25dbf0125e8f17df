use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        Announcement, AnnouncementDetail, AnnouncementStatusFilter, AnnouncementType, Priority,
    },
    error::{AppError, Result},
    repository::{parse_opt_uuid, parse_uuid, AnnouncementRepository},
};

#[derive(FromRow)]
struct AnnouncementRow {
    id: String,
    title: String,
    content: String,
    announcement_type: String,
    priority: String,
    author_id: String,
    target_class_id: Option<String>,
    target_subject_id: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    expiry_at: Option<NaiveDateTime>,
    is_active: i32,
}

#[derive(FromRow)]
struct AnnouncementDetailRow {
    #[sqlx(flatten)]
    announcement: AnnouncementRow,
    author_username: String,
    author_first_name: String,
    author_last_name: String,
    target_class_name: Option<String>,
    target_subject_name: Option<String>,
}

const ANNOUNCEMENT_COLUMNS: &str = r#"
    id, title, content, announcement_type, priority, author_id, target_class_id,
    target_subject_id, created_at, updated_at, expiry_at, is_active
"#;

const DETAIL_SELECT: &str = r#"
    SELECT a.id, a.title, a.content, a.announcement_type, a.priority, a.author_id,
           a.target_class_id, a.target_subject_id, a.created_at, a.updated_at,
           a.expiry_at, a.is_active,
           u.username AS author_username, u.first_name AS author_first_name,
           u.last_name AS author_last_name,
           c.name AS target_class_name, s.name AS target_subject_name
    FROM announcements a
    JOIN users u ON u.id = a.author_id
    LEFT JOIN classes c ON c.id = a.target_class_id
    LEFT JOIN subjects s ON s.id = a.target_subject_id
"#;

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        Ok(Announcement {
            id: parse_uuid(&row.id)?,
            title: row.title,
            content: row.content,
            announcement_type: AnnouncementType::from_str(&row.announcement_type).ok_or_else(|| {
                AppError::Database(format!("Invalid announcement type: {}", row.announcement_type))
            })?,
            priority: Priority::from_str(&row.priority).ok_or_else(|| {
                AppError::Database(format!("Invalid priority: {}", row.priority))
            })?,
            author_id: parse_uuid(&row.author_id)?,
            target_class_id: parse_opt_uuid(row.target_class_id)?,
            target_subject_id: parse_opt_uuid(row.target_subject_id)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
            expiry_at: row.expiry_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            is_active: row.is_active != 0,
        })
    }

    fn row_to_detail(row: AnnouncementDetailRow) -> Result<AnnouncementDetail> {
        let author_name = format!("{} {}", row.author_first_name, row.author_last_name)
            .trim()
            .to_string();

        Ok(AnnouncementDetail {
            announcement: Self::row_to_announcement(row.announcement)?,
            author_name: if author_name.is_empty() { row.author_username } else { author_name },
            target_class_name: row.target_class_name,
            target_subject_name: row.target_subject_name,
        })
    }

    async fn fetch_details(&self, sql: &str, binds: Vec<String>) -> Result<Vec<AnnouncementDetail>> {
        let mut query = sqlx::query_as::<_, AnnouncementDetailRow>(sql);
        for value in binds {
            query = query.bind(value);
        }

        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(Self::row_to_detail)
            .collect()
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(&self, announcement: Announcement) -> Result<Announcement> {
        sqlx::query(
            &format!(
                "INSERT INTO announcements ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                ANNOUNCEMENT_COLUMNS
            )
        )
        .bind(announcement.id.to_string())
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.announcement_type.as_str())
        .bind(announcement.priority.as_str())
        .bind(announcement.author_id.to_string())
        .bind(announcement.target_class_id.map(|id| id.to_string()))
        .bind(announcement.target_subject_id.map(|id| id.to_string()))
        .bind(announcement.created_at.naive_utc())
        .bind(announcement.updated_at.naive_utc())
        .bind(announcement.expiry_at.map(|dt| dt.naive_utc()))
        .bind(announcement.is_active as i32)
        .execute(&self.pool)
        .await?;

        self.find_by_id(announcement.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created announcement".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(
            &format!("SELECT {} FROM announcements WHERE id = ?", ANNOUNCEMENT_COLUMNS)
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_announcement).transpose()
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<AnnouncementDetail>> {
        let row = sqlx::query_as::<_, AnnouncementDetailRow>(
            &format!("{} WHERE a.id = ?", DETAIL_SELECT)
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_detail).transpose()
    }

    async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<AnnouncementDetail>> {
        let rows = sqlx::query_as::<_, AnnouncementDetailRow>(
            &format!(
                "{} WHERE a.is_active = 1 AND (a.expiry_at IS NULL OR a.expiry_at >= ?) ORDER BY a.created_at DESC",
                DETAIL_SELECT
            )
        )
        .bind(now.naive_utc())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_detail)
            .collect()
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<AnnouncementDetail>> {
        self.fetch_details(
            &format!("{} WHERE a.author_id = ? ORDER BY a.created_at DESC", DETAIL_SELECT),
            vec![author_id.to_string()],
        )
        .await
    }

    async fn list_filtered(
        &self,
        announcement_type: Option<AnnouncementType>,
        status: AnnouncementStatusFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<AnnouncementDetail>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(announcement_type) = announcement_type {
            conditions.push("a.announcement_type = ?");
            binds.push(announcement_type.as_str().to_string());
        }

        let now_str = now.naive_utc().format("%Y-%m-%d %H:%M:%S%.f").to_string();
        match status {
            AnnouncementStatusFilter::All => {}
            AnnouncementStatusFilter::Active => {
                conditions.push("a.is_active = 1 AND (a.expiry_at IS NULL OR a.expiry_at >= ?)");
                binds.push(now_str);
            }
            AnnouncementStatusFilter::Expired => {
                conditions.push("a.expiry_at IS NOT NULL AND a.expiry_at < ?");
                binds.push(now_str);
            }
            AnnouncementStatusFilter::Inactive => {
                conditions.push("a.is_active = 0");
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        self.fetch_details(
            &format!("{} {} ORDER BY a.created_at DESC", DETAIL_SELECT, where_clause),
            binds,
        )
        .await
    }

    async fn update(&self, id: Uuid, announcement: Announcement) -> Result<Announcement> {
        let result = sqlx::query(
            r#"
            UPDATE announcements
            SET title = ?, content = ?, announcement_type = ?, priority = ?,
                target_class_id = ?, target_subject_id = ?, expiry_at = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.announcement_type.as_str())
        .bind(announcement.priority.as_str())
        .bind(announcement.target_class_id.map(|id| id.to_string()))
        .bind(announcement.target_subject_id.map(|id| id.to_string()))
        .bind(announcement.expiry_at.map(|dt| dt.naive_utc()))
        .bind(announcement.is_active as i32)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Announcement not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated announcement".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Announcement not found".to_string()));
        }

        Ok(())
    }
}
