use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Instructor {
    pub instructor_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub course_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Semester {
    pub semester_id: i64,
    pub year: i32,
    pub term: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Section {
    pub section_id: i64,
    pub name: String,
    pub course_id: i64,
    pub semester_id: i64,
    pub instructor_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub registration_id: i64,
    pub student_id: i64,
    pub section_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Registration joined with its student and section display names, so list
/// and detail pages render without per-row lookups.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RegistrationRow {
    pub registration_id: i64,
    pub student_id: i64,
    pub section_id: i64,
    pub student_name: String,
    pub section_name: String,
}

/// Login account consumed only through [`crate::database::Store::authenticate`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub account_id: i64,
    pub username: String,
    pub password_sha256: String,
    pub permissions: Vec<String>,
}

// Validated input payloads produced by the forms layer.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorData {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentData {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseData {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemesterData {
    pub year: i32,
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionData {
    pub name: String,
    pub course_id: i64,
    pub semester_id: i64,
    pub instructor_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationData {
    pub student_id: i64,
    pub section_id: i64,
}

impl Instructor {
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

impl Student {
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

impl Semester {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.term, self.year)
    }
}
