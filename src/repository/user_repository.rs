use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    auth::AuthService,
    domain::{UpdateUserRequest, User, UserKind},
    error::{AppError, Result},
    repository::{parse_uuid, NewUser, UserRepository},
};

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct UserRow {
    id: String,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    is_staff: i32,
    is_active: i32,
    last_login_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const USER_COLUMNS: &str = r#"
    id, username, first_name, last_name, email, is_staff, is_active,
    last_login_at, created_at, updated_at
"#;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            id: parse_uuid(&row.id)?,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_staff: row.is_staff != 0,
            is_active: row.is_active != 0,
            last_login_at: row.last_login_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser, profile: &UserKind) -> Result<User> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let password_hash = AuthService::hash_password(&user.password).await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, first_name, last_name, email, password_hash,
                is_staff, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(user.is_staff as i32)
        .bind(user.is_active as i32)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        match profile {
            UserKind::Admin => {}
            UserKind::Teacher { subject_ids, phone } => {
                let teacher_id = Uuid::new_v4().to_string();
                sqlx::query("INSERT INTO teachers (id, user_id, phone) VALUES (?, ?, ?)")
                    .bind(&teacher_id)
                    .bind(id.to_string())
                    .bind(phone)
                    .execute(&mut *tx)
                    .await?;

                for subject_id in subject_ids {
                    sqlx::query("INSERT OR IGNORE INTO teacher_subjects (teacher_id, subject_id) VALUES (?, ?)")
                        .bind(&teacher_id)
                        .bind(subject_id.to_string())
                        .execute(&mut *tx)
                        .await?;
                }
            }
            UserKind::Student { class_id, phone } => {
                sqlx::query("INSERT INTO students (id, user_id, class_id, phone) VALUES (?, ?, ?, ?)")
                    .bind(Uuid::new_v4().to_string())
                    .bind(id.to_string())
                    .bind(class_id.to_string())
                    .bind(phone)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created user".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS)
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            &format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS)
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn get_password_hash(&self, username: &str) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE username = ?"
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash)
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            &format!("SELECT {} FROM users ORDER BY last_name, first_name, username", USER_COLUMNS)
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_user)
            .collect()
    }

    async fn update(&self, id: Uuid, update: UpdateUserRequest) -> Result<User> {
        self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let password_hash = match update.password.as_deref() {
            Some(password) if !password.is_empty() => Some(AuthService::hash_password(password).await?),
            _ => None,
        };
        let is_active_int = update.is_active.map(|b| b as i32);

        sqlx::query(
            r#"
            UPDATE users
            SET first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                email = COALESCE(?, email),
                is_active = COALESCE(?, is_active),
                password_hash = COALESCE(?, password_hash),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(is_active_int)
        .bind(&password_hash)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated user".to_string())
        })
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<User> {
        sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(is_active as i32)
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    async fn count_staff(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_staff = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
