use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemStore;
pub use models::{
    Account, Course, CourseData, Instructor, InstructorData, Registration, RegistrationData,
    RegistrationRow, Section, SectionData, Semester, SemesterData, Student, StudentData,
};
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Repository-style data access for the six entity kinds plus login accounts.
///
/// Each method is a single explicit query; relation traversal is a separate,
/// visible call rather than lazy navigation. Collections come back in
/// identifier order, the store's insertion order.
#[async_trait]
pub trait Store: Send + Sync {
    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    // Accounts ------------------------------------------------------------

    /// Look up an account by username and password digest. Returns `None`
    /// for unknown usernames and wrong passwords alike.
    async fn authenticate(&self, username: &str, password_sha256: &str)
        -> Result<Option<Account>, StoreError>;

    async fn insert_account(
        &self,
        username: &str,
        password_sha256: &str,
        permissions: &[String],
    ) -> Result<i64, StoreError>;

    // Instructors ---------------------------------------------------------

    async fn instructors(&self) -> Result<Vec<Instructor>, StoreError>;
    async fn instructor(&self, id: i64) -> Result<Option<Instructor>, StoreError>;
    async fn insert_instructor(&self, data: InstructorData) -> Result<i64, StoreError>;
    async fn update_instructor(&self, id: i64, data: InstructorData) -> Result<(), StoreError>;
    async fn sections_for_instructor(&self, instructor_id: i64) -> Result<Vec<Section>, StoreError>;

    // Students ------------------------------------------------------------

    async fn students(&self) -> Result<Vec<Student>, StoreError>;
    async fn student(&self, id: i64) -> Result<Option<Student>, StoreError>;
    async fn insert_student(&self, data: StudentData) -> Result<i64, StoreError>;
    async fn update_student(&self, id: i64, data: StudentData) -> Result<(), StoreError>;
    async fn registrations_for_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<RegistrationRow>, StoreError>;

    // Courses -------------------------------------------------------------

    async fn courses(&self) -> Result<Vec<Course>, StoreError>;
    async fn course(&self, id: i64) -> Result<Option<Course>, StoreError>;
    async fn insert_course(&self, data: CourseData) -> Result<i64, StoreError>;
    async fn update_course(&self, id: i64, data: CourseData) -> Result<(), StoreError>;
    async fn sections_for_course(&self, course_id: i64) -> Result<Vec<Section>, StoreError>;

    // Semesters -----------------------------------------------------------

    async fn semesters(&self) -> Result<Vec<Semester>, StoreError>;
    async fn semester(&self, id: i64) -> Result<Option<Semester>, StoreError>;
    async fn insert_semester(&self, data: SemesterData) -> Result<i64, StoreError>;
    async fn update_semester(&self, id: i64, data: SemesterData) -> Result<(), StoreError>;
    async fn sections_for_semester(&self, semester_id: i64) -> Result<Vec<Section>, StoreError>;

    // Sections ------------------------------------------------------------

    async fn sections(&self) -> Result<Vec<Section>, StoreError>;
    async fn section(&self, id: i64) -> Result<Option<Section>, StoreError>;
    async fn insert_section(&self, data: SectionData) -> Result<i64, StoreError>;
    async fn update_section(&self, id: i64, data: SectionData) -> Result<(), StoreError>;
    async fn registrations_for_section(
        &self,
        section_id: i64,
    ) -> Result<Vec<RegistrationRow>, StoreError>;

    // Registrations -------------------------------------------------------

    async fn registrations(&self) -> Result<Vec<RegistrationRow>, StoreError>;
    async fn registration(&self, id: i64) -> Result<Option<Registration>, StoreError>;
    /// Identifier of the registration for a (student, section) pair, if any.
    /// Backs the uniqueness check in form validation.
    async fn find_registration(
        &self,
        student_id: i64,
        section_id: i64,
    ) -> Result<Option<i64>, StoreError>;
    /// Inserts a registration; a duplicate (student, section) pair is a
    /// [`StoreError::Conflict`].
    async fn insert_registration(&self, data: RegistrationData) -> Result<i64, StoreError>;
    async fn update_registration(&self, id: i64, data: RegistrationData) -> Result<(), StoreError>;
}
