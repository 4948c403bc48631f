use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::models::*;
use super::{Store, StoreError};
use crate::config;

/// Production store backed by PostgreSQL. Every trait method is one
/// explicit query; referential integrity and the (student, section)
/// uniqueness constraint live in the schema.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect, apply pending migrations, and return the store.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config::config().database.max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        info!("connected to courseinfo database");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn affected_or_not_found(rows: u64) -> Result<(), StoreError> {
    if rows == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(what.to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::Conflict(format!("{}: dangling reference", what))
        }
        _ => StoreError::Sqlx(err),
    }
}

const REGISTRATION_ROW_SELECT: &str = "SELECT r.registration_id, r.student_id, r.section_id, \
     st.last_name || ', ' || st.first_name AS student_name, \
     se.name AS section_name \
     FROM registration r \
     JOIN student st ON st.student_id = r.student_id \
     JOIN section se ON se.section_id = r.section_id";

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn authenticate(
        &self,
        username: &str,
        password_sha256: &str,
    ) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT account_id, username, password_sha256, permissions \
             FROM account WHERE username = $1 AND password_sha256 = $2",
        )
        .bind(username)
        .bind(password_sha256)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn insert_account(
        &self,
        username: &str,
        password_sha256: &str,
        permissions: &[String],
    ) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO account (username, password_sha256, permissions) \
             VALUES ($1, $2, $3) RETURNING account_id",
        )
        .bind(username)
        .bind(password_sha256)
        .bind(permissions)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "username already taken"))?;
        Ok(id)
    }

    async fn instructors(&self) -> Result<Vec<Instructor>, StoreError> {
        let rows = sqlx::query_as::<_, Instructor>(
            "SELECT instructor_id, first_name, last_name, created_at \
             FROM instructor ORDER BY instructor_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn instructor(&self, id: i64) -> Result<Option<Instructor>, StoreError> {
        let row = sqlx::query_as::<_, Instructor>(
            "SELECT instructor_id, first_name, last_name, created_at \
             FROM instructor WHERE instructor_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_instructor(&self, data: InstructorData) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO instructor (first_name, last_name) \
             VALUES ($1, $2) RETURNING instructor_id",
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_instructor(&self, id: i64, data: InstructorData) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE instructor SET first_name = $2, last_name = $3 WHERE instructor_id = $1",
        )
        .bind(id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .execute(&self.pool)
        .await?;
        affected_or_not_found(result.rows_affected())
    }

    async fn sections_for_instructor(&self, instructor_id: i64) -> Result<Vec<Section>, StoreError> {
        let rows = sqlx::query_as::<_, Section>(
            "SELECT section_id, name, course_id, semester_id, instructor_id, created_at \
             FROM section WHERE instructor_id = $1 ORDER BY section_id",
        )
        .bind(instructor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn students(&self) -> Result<Vec<Student>, StoreError> {
        let rows = sqlx::query_as::<_, Student>(
            "SELECT student_id, first_name, last_name, created_at \
             FROM student ORDER BY student_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn student(&self, id: i64) -> Result<Option<Student>, StoreError> {
        let row = sqlx::query_as::<_, Student>(
            "SELECT student_id, first_name, last_name, created_at \
             FROM student WHERE student_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_student(&self, data: StudentData) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO student (first_name, last_name) VALUES ($1, $2) RETURNING student_id",
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_student(&self, id: i64, data: StudentData) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE student SET first_name = $2, last_name = $3 WHERE student_id = $1",
        )
        .bind(id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .execute(&self.pool)
        .await?;
        affected_or_not_found(result.rows_affected())
    }

    async fn registrations_for_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        let sql = format!("{} WHERE r.student_id = $1 ORDER BY r.registration_id", REGISTRATION_ROW_SELECT);
        let rows = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn courses(&self) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query_as::<_, Course>(
            "SELECT course_id, name, description, created_at FROM course ORDER BY course_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn course(&self, id: i64) -> Result<Option<Course>, StoreError> {
        let row = sqlx::query_as::<_, Course>(
            "SELECT course_id, name, description, created_at FROM course WHERE course_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_course(&self, data: CourseData) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO course (name, description) VALUES ($1, $2) RETURNING course_id",
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_course(&self, id: i64, data: CourseData) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE course SET name = $2, description = $3 WHERE course_id = $1")
                .bind(id)
                .bind(&data.name)
                .bind(&data.description)
                .execute(&self.pool)
                .await?;
        affected_or_not_found(result.rows_affected())
    }

    async fn sections_for_course(&self, course_id: i64) -> Result<Vec<Section>, StoreError> {
        let rows = sqlx::query_as::<_, Section>(
            "SELECT section_id, name, course_id, semester_id, instructor_id, created_at \
             FROM section WHERE course_id = $1 ORDER BY section_id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn semesters(&self) -> Result<Vec<Semester>, StoreError> {
        let rows = sqlx::query_as::<_, Semester>(
            "SELECT semester_id, year, term, created_at FROM semester ORDER BY semester_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn semester(&self, id: i64) -> Result<Option<Semester>, StoreError> {
        let row = sqlx::query_as::<_, Semester>(
            "SELECT semester_id, year, term, created_at FROM semester WHERE semester_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_semester(&self, data: SemesterData) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO semester (year, term) VALUES ($1, $2) RETURNING semester_id",
        )
        .bind(data.year)
        .bind(&data.term)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_semester(&self, id: i64, data: SemesterData) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE semester SET year = $2, term = $3 WHERE semester_id = $1")
                .bind(id)
                .bind(data.year)
                .bind(&data.term)
                .execute(&self.pool)
                .await?;
        affected_or_not_found(result.rows_affected())
    }

    async fn sections_for_semester(&self, semester_id: i64) -> Result<Vec<Section>, StoreError> {
        let rows = sqlx::query_as::<_, Section>(
            "SELECT section_id, name, course_id, semester_id, instructor_id, created_at \
             FROM section WHERE semester_id = $1 ORDER BY section_id",
        )
        .bind(semester_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn sections(&self) -> Result<Vec<Section>, StoreError> {
        let rows = sqlx::query_as::<_, Section>(
            "SELECT section_id, name, course_id, semester_id, instructor_id, created_at \
             FROM section ORDER BY section_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn section(&self, id: i64) -> Result<Option<Section>, StoreError> {
        let row = sqlx::query_as::<_, Section>(
            "SELECT section_id, name, course_id, semester_id, instructor_id, created_at \
             FROM section WHERE section_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_section(&self, data: SectionData) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO section (name, course_id, semester_id, instructor_id) \
             VALUES ($1, $2, $3, $4) RETURNING section_id",
        )
        .bind(&data.name)
        .bind(data.course_id)
        .bind(data.semester_id)
        .bind(data.instructor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "section insert"))?;
        Ok(id)
    }

    async fn update_section(&self, id: i64, data: SectionData) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE section SET name = $2, course_id = $3, semester_id = $4, instructor_id = $5 \
             WHERE section_id = $1",
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.course_id)
        .bind(data.semester_id)
        .bind(data.instructor_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "section update"))?;
        affected_or_not_found(result.rows_affected())
    }

    async fn registrations_for_section(
        &self,
        section_id: i64,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        let sql = format!("{} WHERE r.section_id = $1 ORDER BY r.registration_id", REGISTRATION_ROW_SELECT);
        let rows = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(section_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn registrations(&self) -> Result<Vec<RegistrationRow>, StoreError> {
        let sql = format!("{} ORDER BY r.registration_id", REGISTRATION_ROW_SELECT);
        let rows = sqlx::query_as::<_, RegistrationRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn registration(&self, id: i64) -> Result<Option<Registration>, StoreError> {
        let row = sqlx::query_as::<_, Registration>(
            "SELECT registration_id, student_id, section_id, created_at \
             FROM registration WHERE registration_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_registration(
        &self,
        student_id: i64,
        section_id: i64,
    ) -> Result<Option<i64>, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT registration_id FROM registration WHERE student_id = $1 AND section_id = $2",
        )
        .bind(student_id)
        .bind(section_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn insert_registration(&self, data: RegistrationData) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO registration (student_id, section_id) \
             VALUES ($1, $2) RETURNING registration_id",
        )
        .bind(data.student_id)
        .bind(data.section_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "student already registered for section"))?;
        Ok(id)
    }

    async fn update_registration(&self, id: i64, data: RegistrationData) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE registration SET student_id = $2, section_id = $3 WHERE registration_id = $1",
        )
        .bind(id)
        .bind(data.student_id)
        .bind(data.section_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "student already registered for section"))?;
        affected_or_not_found(result.rows_affected())
    }
}
