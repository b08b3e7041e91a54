/// PostgreSQL-backed stores.
///
/// Uniqueness of `students.nim`, `admins.username` and `history.student_id`
/// is enforced by the schema (see `migrations/`), so concurrent creates
/// cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{AdminRecord, HistoryEntry, HistoryView, StudentRecord, StudentSummary};
use crate::error::AppError;
use crate::store::{AdminStore, HistoryStore, StudentStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const STUDENT_COLUMNS: &str =
    "id, nim, name, password_hash, dob, phone, address, hobby, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct StudentRow {
    id: Uuid,
    nim: String,
    name: String,
    password_hash: String,
    dob: NaiveDate,
    phone: Option<String>,
    address: Option<String>,
    hobby: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StudentRow> for StudentRecord {
    fn from(row: StudentRow) -> Self {
        StudentRecord {
            id: row.id,
            nim: row.nim,
            name: row.name,
            password_hash: row.password_hash,
            dob: row.dob,
            phone: row.phone,
            address: row.address,
            hobby: row.hobby,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AdminRow {
    id: Uuid,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AdminRow> for AdminRecord {
    fn from(row: AdminRow) -> Self {
        AdminRecord {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: Uuid,
    student_id: Uuid,
    last_login: Option<DateTime<Utc>>,
    last_logout: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        HistoryEntry {
            id: row.id,
            student_id: row.student_id,
            last_login: row.last_login,
            last_logout: row.last_logout,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// History row joined with the (possibly missing) student
#[derive(sqlx::FromRow)]
struct HistoryListRow {
    id: Uuid,
    student_id: Uuid,
    last_login: Option<DateTime<Utc>>,
    last_logout: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    student_name: Option<String>,
    student_nim: Option<String>,
}

impl From<HistoryListRow> for HistoryView {
    fn from(row: HistoryListRow) -> Self {
        let student = match (row.student_name, row.student_nim) {
            (Some(name), Some(nim)) => Some(StudentSummary {
                id: row.student_id,
                name,
                nim,
            }),
            _ => None,
        };
        HistoryView {
            id: row.id,
            student,
            last_login: row.last_login,
            last_logout: row.last_logout,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl StudentStore for PgStore {
    async fn insert_student(&self, student: StudentRecord) -> Result<StudentRecord, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
            INSERT INTO students (id, nim, name, password_hash, dob, phone, address, hobby, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(student.id)
        .bind(&student.nim)
        .bind(&student.name)
        .bind(&student.password_hash)
        .bind(student.dob)
        .bind(student.phone.as_deref())
        .bind(student.address.as_deref())
        .bind(student.hobby.as_deref())
        .bind(student.created_at)
        .bind(student.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<StudentRecord>, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students WHERE id = $1",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_student_by_nim(&self, nim: &str) -> Result<Option<StudentRecord>, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students WHERE nim = $1",
            STUDENT_COLUMNS
        ))
        .bind(nim)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_students(&self) -> Result<Vec<StudentRecord>, AppError> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students ORDER BY name ASC, nim ASC",
            STUDENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_student(&self, student: StudentRecord) -> Result<Option<StudentRecord>, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
            UPDATE students
            SET nim = $2, name = $3, password_hash = $4, dob = $5,
                phone = $6, address = $7, hobby = $8, updated_at = $9
            WHERE id = $1
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(student.id)
        .bind(&student.nim)
        .bind(&student.name)
        .bind(&student.password_hash)
        .bind(student.dob)
        .bind(student.phone.as_deref())
        .bind(student.address.as_deref())
        .bind(student.hobby.as_deref())
        .bind(student.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_student(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AdminStore for PgStore {
    async fn insert_admin(&self, admin: AdminRecord) -> Result<AdminRecord, AppError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r#"
            INSERT INTO admins (id, username, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password_hash, created_at, updated_at
            "#,
        )
        .bind(admin.id)
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .bind(admin.created_at)
        .bind(admin.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_admin(&self, id: Uuid) -> Result<Option<AdminRecord>, AppError> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, username, password_hash, created_at, updated_at FROM admins WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<AdminRecord>, AppError> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, username, password_hash, created_at, updated_at FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl HistoryStore for PgStore {
    async fn upsert_login(&self, student_id: Uuid, at: DateTime<Utc>) -> Result<HistoryEntry, AppError> {
        let row = sqlx::query_as::<_, HistoryRow>(
            r#"
            INSERT INTO history (id, student_id, last_login, last_logout, created_at, updated_at)
            VALUES ($1, $2, $3, NULL, $3, $3)
            ON CONFLICT (student_id)
            DO UPDATE SET last_login = EXCLUDED.last_login, updated_at = EXCLUDED.updated_at
            RETURNING id, student_id, last_login, last_logout, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_logout(
        &self,
        student_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<HistoryEntry>, AppError> {
        let row = sqlx::query_as::<_, HistoryRow>(
            r#"
            UPDATE history
            SET last_logout = $2, updated_at = $2
            WHERE student_id = $1
            RETURNING id, student_id, last_login, last_logout, created_at, updated_at
            "#,
        )
        .bind(student_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_history(&self) -> Result<Vec<HistoryView>, AppError> {
        let rows = sqlx::query_as::<_, HistoryListRow>(
            r#"
            SELECT h.id, h.student_id, h.last_login, h.last_logout, h.created_at, h.updated_at,
                   s.name AS student_name, s.nim AS student_nim
            FROM history h
            LEFT JOIN students s ON s.id = h.student_id
            ORDER BY h.last_login DESC NULLS LAST
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_history(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM history WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_history(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM history").execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}
