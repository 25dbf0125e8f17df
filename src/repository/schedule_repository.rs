use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Period, Schedule, ScheduleEntry, Weekday},
    error::{AppError, Result},
    repository::{parse_uuid, ScheduleRepository},
};

#[derive(FromRow)]
struct ScheduleRow {
    id: String,
    class_id: String,
    subject_id: String,
    teacher_id: String,
    day: String,
    period: i64,
    room: String,
    notes: Option<String>,
}

#[derive(FromRow)]
struct ScheduleEntryRow {
    #[sqlx(flatten)]
    schedule: ScheduleRow,
    class_name: String,
    subject_name: String,
    teacher_username: String,
    teacher_first_name: String,
    teacher_last_name: String,
}

const ENTRY_SELECT: &str = r#"
    SELECT sc.id, sc.class_id, sc.subject_id, sc.teacher_id, sc.day, sc.period,
           sc.room, sc.notes,
           c.name AS class_name, s.name AS subject_name,
           u.username AS teacher_username, u.first_name AS teacher_first_name,
           u.last_name AS teacher_last_name
    FROM schedules sc
    JOIN classes c ON c.id = sc.class_id
    JOIN subjects s ON s.id = sc.subject_id
    JOIN teachers t ON t.id = sc.teacher_id
    JOIN users u ON u.id = t.user_id
"#;

// Weekdays are stored by name; order them Monday first.
const DAY_ORDER: &str = r#"
    CASE sc.day
        WHEN 'monday' THEN 1 WHEN 'tuesday' THEN 2 WHEN 'wednesday' THEN 3
        WHEN 'thursday' THEN 4 WHEN 'friday' THEN 5 ELSE 6
    END
"#;

pub struct SqliteScheduleRepository {
    pool: SqlitePool,
}

impl SqliteScheduleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_schedule(row: ScheduleRow) -> Result<Schedule> {
        let period = u8::try_from(row.period)
            .ok()
            .and_then(Period::new)
            .ok_or_else(|| AppError::Database(format!("Invalid period: {}", row.period)))?;

        Ok(Schedule {
            id: parse_uuid(&row.id)?,
            class_id: parse_uuid(&row.class_id)?,
            subject_id: parse_uuid(&row.subject_id)?,
            teacher_id: parse_uuid(&row.teacher_id)?,
            day: Weekday::from_str(&row.day)
                .ok_or_else(|| AppError::Database(format!("Invalid day: {}", row.day)))?,
            period,
            room: row.room,
            notes: row.notes,
        })
    }

    fn row_to_entry(row: ScheduleEntryRow) -> Result<ScheduleEntry> {
        let schedule = Self::row_to_schedule(row.schedule)?;
        let teacher_name = format!("{} {}", row.teacher_first_name, row.teacher_last_name)
            .trim()
            .to_string();

        Ok(ScheduleEntry {
            time_slot: schedule.period.time_slot(),
            schedule,
            class_name: row.class_name,
            subject_name: row.subject_name,
            teacher_name: if teacher_name.is_empty() { row.teacher_username } else { teacher_name },
        })
    }

    async fn list_entries(&self, column: &str, id: Uuid) -> Result<Vec<ScheduleEntry>> {
        let rows = sqlx::query_as::<_, ScheduleEntryRow>(
            &format!("{} WHERE sc.{} = ? ORDER BY {}, sc.period", ENTRY_SELECT, column, DAY_ORDER)
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_entry)
            .collect()
    }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepository {
    async fn create(&self, schedule: Schedule) -> Result<Schedule> {
        sqlx::query(
            r#"
            INSERT INTO schedules (id, class_id, subject_id, teacher_id, day, period, room, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(schedule.id.to_string())
        .bind(schedule.class_id.to_string())
        .bind(schedule.subject_id.to_string())
        .bind(schedule.teacher_id.to_string())
        .bind(schedule.day.as_str())
        .bind(schedule.period.number() as i64)
        .bind(&schedule.room)
        .bind(&schedule.notes)
        .execute(&self.pool)
        .await?;

        self.find_by_id(schedule.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created schedule".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Schedule>> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT id, class_id, subject_id, teacher_id, day, period, room, notes
            FROM schedules
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_schedule).transpose()
    }

    async fn update(&self, schedule: Schedule) -> Result<Schedule> {
        let result = sqlx::query(
            r#"
            UPDATE schedules
            SET class_id = ?, subject_id = ?, teacher_id = ?, day = ?, period = ?,
                room = ?, notes = ?
            WHERE id = ?
            "#
        )
        .bind(schedule.class_id.to_string())
        .bind(schedule.subject_id.to_string())
        .bind(schedule.teacher_id.to_string())
        .bind(schedule.day.as_str())
        .bind(schedule.period.number() as i64)
        .bind(&schedule.room)
        .bind(&schedule.notes)
        .bind(schedule.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Schedule not found".to_string()));
        }

        self.find_by_id(schedule.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated schedule".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Schedule not found".to_string()));
        }

        Ok(())
    }

    async fn list_by_class(&self, class_id: Uuid) -> Result<Vec<ScheduleEntry>> {
        self.list_entries("class_id", class_id).await
    }

    async fn list_by_teacher(&self, teacher_id: Uuid) -> Result<Vec<ScheduleEntry>> {
        self.list_entries("teacher_id", teacher_id).await
    }

    async fn list_conflict_candidates(&self, day: Weekday, period: Period) -> Result<Vec<Schedule>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT id, class_id, subject_id, teacher_id, day, period, room, notes
            FROM schedules
            WHERE day = ? AND period = ?
            "#
        )
        .bind(day.as_str())
        .bind(period.number() as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_schedule)
            .collect()
    }
}
