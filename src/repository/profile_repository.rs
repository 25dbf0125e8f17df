use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Student, StudentListing, Teacher, TeacherListing},
    error::{AppError, Result},
    repository::{parse_uuid, ProfileRepository},
};

#[derive(FromRow)]
struct TeacherRow {
    id: String,
    user_id: String,
    phone: String,
}

#[derive(FromRow)]
struct StudentRow {
    id: String,
    user_id: String,
    class_id: String,
    phone: String,
}

#[derive(FromRow)]
struct TeacherListingRow {
    teacher_id: String,
    user_id: String,
    username: String,
    first_name: String,
    last_name: String,
    is_active: i32,
    phone: String,
    subject_name: Option<String>,
}

#[derive(FromRow)]
struct StudentListingRow {
    student_id: String,
    user_id: String,
    username: String,
    first_name: String,
    last_name: String,
    is_active: i32,
    phone: String,
    class_id: String,
    class_name: String,
}

const STUDENT_LISTING_SELECT: &str = r#"
    SELECT st.id AS student_id, u.id AS user_id, u.username, u.first_name, u.last_name,
           u.is_active, st.phone, c.id AS class_id, c.name AS class_name
    FROM students st
    JOIN users u ON u.id = st.user_id
    JOIN classes c ON c.id = st.class_id
"#;

fn display_name(first: &str, last: &str, username: &str) -> String {
    let name = format!("{} {}", first, last).trim().to_string();
    if name.is_empty() {
        username.to_string()
    } else {
        name
    }
}

pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn subject_ids_for(&self, teacher_id: &str) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT subject_id FROM teacher_subjects WHERE teacher_id = ? ORDER BY subject_id"
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;

        ids.iter().map(|id| parse_uuid(id)).collect()
    }

    async fn hydrate_teacher(&self, row: TeacherRow) -> Result<Teacher> {
        let subject_ids = self.subject_ids_for(&row.id).await?;
        Ok(Teacher {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            phone: row.phone,
            subject_ids,
        })
    }

    fn row_to_student(row: StudentRow) -> Result<Student> {
        Ok(Student {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            class_id: parse_uuid(&row.class_id)?,
            phone: row.phone,
        })
    }

    fn row_to_student_listing(row: StudentListingRow) -> Result<StudentListing> {
        Ok(StudentListing {
            student_id: parse_uuid(&row.student_id)?,
            user_id: parse_uuid(&row.user_id)?,
            full_name: display_name(&row.first_name, &row.last_name, &row.username),
            username: row.username,
            is_active: row.is_active != 0,
            phone: row.phone,
            class_id: parse_uuid(&row.class_id)?,
            class_name: row.class_name,
        })
    }

    async fn replace_subjects(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        teacher_id: &str,
        subject_ids: &[Uuid],
    ) -> Result<()> {
        sqlx::query("DELETE FROM teacher_subjects WHERE teacher_id = ?")
            .bind(teacher_id)
            .execute(&mut **tx)
            .await?;

        for subject_id in subject_ids {
            sqlx::query("INSERT OR IGNORE INTO teacher_subjects (teacher_id, subject_id) VALUES (?, ?)")
                .bind(teacher_id)
                .bind(subject_id.to_string())
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepository {
    async fn find_teacher(&self, id: Uuid) -> Result<Option<Teacher>> {
        let row = sqlx::query_as::<_, TeacherRow>(
            "SELECT id, user_id, phone FROM teachers WHERE id = ?"
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(self.hydrate_teacher(r).await?)),
            None => Ok(None),
        }
    }

    async fn find_teacher_by_user(&self, user_id: Uuid) -> Result<Option<Teacher>> {
        let row = sqlx::query_as::<_, TeacherRow>(
            "SELECT id, user_id, phone FROM teachers WHERE user_id = ?"
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(self.hydrate_teacher(r).await?)),
            None => Ok(None),
        }
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>> {
        let row = sqlx::query_as::<_, StudentRow>(
            "SELECT id, user_id, class_id, phone FROM students WHERE id = ?"
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_student).transpose()
    }

    async fn find_student_by_user(&self, user_id: Uuid) -> Result<Option<Student>> {
        let row = sqlx::query_as::<_, StudentRow>(
            "SELECT id, user_id, class_id, phone FROM students WHERE user_id = ?"
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_student).transpose()
    }

    async fn update_teacher(&self, id: Uuid, phone: Option<String>, subject_ids: Option<Vec<Uuid>>) -> Result<Teacher> {
        let id_str = id.to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE teachers SET phone = COALESCE(?, phone) WHERE id = ?")
            .bind(&phone)
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        if let Some(subject_ids) = subject_ids {
            Self::replace_subjects(&mut tx, &id_str, &subject_ids).await?;
        }
        tx.commit().await?;

        self.find_teacher(id).await?
            .ok_or_else(|| AppError::NotFound("Teacher not found".to_string()))
    }

    async fn update_student(&self, id: Uuid, class_id: Option<Uuid>, phone: Option<String>) -> Result<Student> {
        sqlx::query(
            "UPDATE students SET class_id = COALESCE(?, class_id), phone = COALESCE(?, phone) WHERE id = ?"
        )
        .bind(class_id.map(|c| c.to_string()))
        .bind(&phone)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.find_student(id).await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
    }

    async fn list_teachers(&self) -> Result<Vec<TeacherListing>> {
        let rows = sqlx::query_as::<_, TeacherListingRow>(
            r#"
            SELECT t.id AS teacher_id, u.id AS user_id, u.username, u.first_name, u.last_name,
                   u.is_active, t.phone, s.name AS subject_name
            FROM teachers t
            JOIN users u ON u.id = t.user_id
            LEFT JOIN teacher_subjects ts ON ts.teacher_id = t.id
            LEFT JOIN subjects s ON s.id = ts.subject_id
            ORDER BY u.last_name, u.first_name, t.id, s.name
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        // One row per (teacher, subject); fold consecutive rows together.
        let mut listings: Vec<TeacherListing> = Vec::new();
        for row in rows {
            let teacher_id = parse_uuid(&row.teacher_id)?;
            match listings.last_mut() {
                Some(last) if last.teacher_id == teacher_id => {
                    last.subjects.extend(row.subject_name);
                }
                _ => listings.push(TeacherListing {
                    teacher_id,
                    user_id: parse_uuid(&row.user_id)?,
                    full_name: display_name(&row.first_name, &row.last_name, &row.username),
                    username: row.username,
                    is_active: row.is_active != 0,
                    phone: row.phone,
                    subjects: row.subject_name.into_iter().collect(),
                }),
            }
        }

        Ok(listings)
    }

    async fn list_students(&self) -> Result<Vec<StudentListing>> {
        let rows = sqlx::query_as::<_, StudentListingRow>(
            &format!("{} ORDER BY c.name, u.last_name, u.first_name", STUDENT_LISTING_SELECT)
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_student_listing)
            .collect()
    }

    async fn list_students_in_class(&self, class_id: Uuid) -> Result<Vec<StudentListing>> {
        let rows = sqlx::query_as::<_, StudentListingRow>(
            &format!("{} WHERE st.class_id = ? ORDER BY u.last_name, u.first_name", STUDENT_LISTING_SELECT)
        )
        .bind(class_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_student_listing)
            .collect()
    }

    async fn count_teachers(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM teachers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_students(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
