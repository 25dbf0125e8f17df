use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{ActivityLog, ActivityPage, ActivityQuery, ActivityType, ClientInfo},
    error::{AppError, Result},
    repository::{parse_opt_uuid, parse_uuid, ActivityRepository},
};

#[derive(FromRow)]
struct ActivityRow {
    id: String,
    user_id: Option<String>,
    username: Option<String>,
    activity_type: String,
    description: String,
    ip_address: Option<String>,
    user_agent: String,
    created_at: NaiveDateTime,
}

const ACTIVITY_SELECT: &str = r#"
    SELECT l.id, l.user_id, u.username, l.activity_type, l.description,
           l.ip_address, l.user_agent, l.created_at
    FROM activity_logs l
    LEFT JOIN users u ON u.id = l.user_id
"#;

pub struct SqliteActivityRepository {
    pool: SqlitePool,
}

impl SqliteActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_activity(row: ActivityRow) -> Result<ActivityLog> {
        Ok(ActivityLog {
            id: parse_uuid(&row.id)?,
            user_id: parse_opt_uuid(row.user_id)?,
            username: row.username,
            activity_type: ActivityType::from_str(&row.activity_type).ok_or_else(|| {
                AppError::Database(format!("Invalid activity type: {}", row.activity_type))
            })?,
            description: row.description,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    fn filters(query: &ActivityQuery) -> (String, Vec<String>) {
        let mut conditions: Vec<&str> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(activity_type) = query.activity_type {
            conditions.push("l.activity_type = ?");
            binds.push(activity_type.as_str().to_string());
        }
        if let Some(date_from) = query.date_from {
            conditions.push("date(l.created_at) >= ?");
            binds.push(date_from.format("%Y-%m-%d").to_string());
        }
        if let Some(date_to) = query.date_to {
            conditions.push("date(l.created_at) <= ?");
            binds.push(date_to.format("%Y-%m-%d").to_string());
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            conditions.push("(l.description LIKE ? OR u.username LIKE ?)");
            let pattern = format!("%{}%", search);
            binds.push(pattern.clone());
            binds.push(pattern);
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, binds)
    }
}

#[async_trait]
impl ActivityRepository for SqliteActivityRepository {
    async fn record(
        &self,
        user_id: Option<Uuid>,
        activity_type: ActivityType,
        description: &str,
        client: &ClientInfo,
    ) -> Result<ActivityLog> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, user_id, activity_type, description, ip_address, user_agent, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(user_id.map(|id| id.to_string()))
        .bind(activity_type.as_str())
        .bind(description)
        .bind(&client.ip_address)
        .bind(&client.user_agent)
        .bind(now.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(ActivityLog {
            id,
            user_id,
            username: None,
            activity_type,
            description: description.to_string(),
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            created_at: now,
        })
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ActivityLog>> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            &format!("{} ORDER BY l.created_at DESC LIMIT ?", ACTIVITY_SELECT)
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_activity)
            .collect()
    }

    async fn search(&self, query: &ActivityQuery, per_page: i64) -> Result<ActivityPage> {
        let per_page = per_page.max(1);
        let (where_clause, binds) = Self::filters(query);

        let count_sql = format!(
            "SELECT COUNT(*) FROM activity_logs l LEFT JOIN users u ON u.id = l.user_id {}",
            where_clause
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in &binds {
            count_query = count_query.bind(value);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let total_pages = ((total + per_page - 1) / per_page).max(1);
        // Out-of-range pages land on the nearest valid one.
        let page = query.page.unwrap_or(1).clamp(1, total_pages);

        let list_sql = format!(
            "{} {} ORDER BY l.created_at DESC LIMIT ? OFFSET ?",
            ACTIVITY_SELECT, where_clause
        );
        let mut list_query = sqlx::query_as::<_, ActivityRow>(&list_sql);
        for value in &binds {
            list_query = list_query.bind(value);
        }
        let rows = list_query
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        let activities = rows
            .into_iter()
            .map(Self::row_to_activity)
            .collect::<Result<Vec<_>>>()?;

        Ok(ActivityPage {
            activities,
            page,
            per_page,
            total,
            total_pages,
        })
    }
}
