//! Form binding and validation for the six entity kinds.
//!
//! Each form binds loosely from submitted urlencoded data (missing fields
//! become empty strings), then `validate` turns it into a typed payload or
//! a map of field-level errors. Reference fields are checked against the
//! store so a dangling id is a field error, not a persistence failure.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use tera::Context;

use crate::database::{
    Course, CourseData, Instructor, InstructorData, Registration, RegistrationData, Section,
    SectionData, Semester, SemesterData, Store, StoreError, Student, StudentData,
};

pub type FormErrors = BTreeMap<String, String>;

/// Outcome of validating a bound form: the typed payload, or the field
/// errors to render back. Store failures during validation are not a
/// validation outcome and travel separately.
pub type Validated<T> = Result<T, FormErrors>;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice.";
pub const INVALID_NUMBER: &str = "Enter a whole number.";
pub const DUPLICATE_REGISTRATION: &str = "This student is already registered for this section.";

/// One entity kind's create/update form: schema, template, and redirect
/// target in one place, so a single generic handler drives all six kinds.
#[async_trait]
pub trait EntityForm: Default + Serialize + Send + Sync + 'static {
    type Record: Send + Sync;
    type Data: Send;

    /// URL slug and display noun, e.g. `instructor`.
    const NOUN: &'static str;
    const TEMPLATE: &'static str;

    /// Pre-fill the form from an existing record (update GET).
    fn from_record(record: &Self::Record) -> Self;

    /// Validate bound values. `existing` is the record id when updating,
    /// so uniqueness checks can ignore the record itself. The outer error
    /// is a store failure during a lookup, which propagates rather than
    /// masquerading as a bad field value.
    async fn validate(&self, store: &dyn Store, existing: Option<i64>)
        -> Result<Validated<Self::Data>, StoreError>;

    async fn load(store: &dyn Store, id: i64) -> Result<Option<Self::Record>, StoreError>;
    async fn insert(store: &dyn Store, data: Self::Data) -> Result<i64, StoreError>;
    async fn update(store: &dyn Store, id: i64, data: Self::Data) -> Result<(), StoreError>;

    /// Choice lists for reference fields, added to the template context.
    async fn choices(_store: &dyn Store, _ctx: &mut Context) -> Result<(), StoreError> {
        Ok(())
    }

    fn detail_path(id: i64) -> String {
        format!("/{}/{}/", Self::NOUN, id)
    }

    fn create_path() -> String {
        format!("/{}/create/", Self::NOUN)
    }

    fn update_path(id: i64) -> String {
        format!("/{}/{}/update/", Self::NOUN, id)
    }
}

/// Require a non-empty trimmed value.
fn required(errors: &mut FormErrors, field: &str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.insert(field.to_string(), REQUIRED.to_string());
        None
    } else {
        Some(value.to_string())
    }
}

/// Require a reference field: non-empty and a well-formed identifier.
/// Existence is checked by the caller against the store.
fn reference(errors: &mut FormErrors, field: &str, value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        errors.insert(field.to_string(), REQUIRED.to_string());
        return None;
    }
    match value.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.insert(field.to_string(), INVALID_CHOICE.to_string());
            None
        }
    }
}

fn invalid_choice(errors: &mut FormErrors, field: &str) {
    errors.insert(field.to_string(), INVALID_CHOICE.to_string());
}

// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InstructorForm {
    pub first_name: String,
    pub last_name: String,
}

#[async_trait]
impl EntityForm for InstructorForm {
    type Record = Instructor;
    type Data = InstructorData;

    const NOUN: &'static str = "instructor";
    const TEMPLATE: &'static str = "instructor_form.html";

    fn from_record(record: &Instructor) -> Self {
        Self { first_name: record.first_name.clone(), last_name: record.last_name.clone() }
    }

    async fn validate(
        &self,
        _store: &dyn Store,
        _existing: Option<i64>,
    ) -> Result<Validated<InstructorData>, StoreError> {
        let mut errors = FormErrors::new();
        let first_name = required(&mut errors, "first_name", &self.first_name);
        let last_name = required(&mut errors, "last_name", &self.last_name);
        Ok(match (first_name, last_name) {
            (Some(first_name), Some(last_name)) if errors.is_empty() => {
                Ok(InstructorData { first_name, last_name })
            }
            _ => Err(errors),
        })
    }

    async fn load(store: &dyn Store, id: i64) -> Result<Option<Instructor>, StoreError> {
        store.instructor(id).await
    }

    async fn insert(store: &dyn Store, data: InstructorData) -> Result<i64, StoreError> {
        store.insert_instructor(data).await
    }

    async fn update(store: &dyn Store, id: i64, data: InstructorData) -> Result<(), StoreError> {
        store.update_instructor(id, data).await
    }
}

// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
}

#[async_trait]
impl EntityForm for StudentForm {
    type Record = Student;
    type Data = StudentData;

    const NOUN: &'static str = "student";
    const TEMPLATE: &'static str = "student_form.html";

    fn from_record(record: &Student) -> Self {
        Self { first_name: record.first_name.clone(), last_name: record.last_name.clone() }
    }

    async fn validate(
        &self,
        _store: &dyn Store,
        _existing: Option<i64>,
    ) -> Result<Validated<StudentData>, StoreError> {
        let mut errors = FormErrors::new();
        let first_name = required(&mut errors, "first_name", &self.first_name);
        let last_name = required(&mut errors, "last_name", &self.last_name);
        Ok(match (first_name, last_name) {
            (Some(first_name), Some(last_name)) if errors.is_empty() => {
                Ok(StudentData { first_name, last_name })
            }
            _ => Err(errors),
        })
    }

    async fn load(store: &dyn Store, id: i64) -> Result<Option<Student>, StoreError> {
        store.student(id).await
    }

    async fn insert(store: &dyn Store, data: StudentData) -> Result<i64, StoreError> {
        store.insert_student(data).await
    }

    async fn update(store: &dyn Store, id: i64, data: StudentData) -> Result<(), StoreError> {
        store.update_student(id, data).await
    }
}

// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CourseForm {
    pub name: String,
    pub description: String,
}

#[async_trait]
impl EntityForm for CourseForm {
    type Record = Course;
    type Data = CourseData;

    const NOUN: &'static str = "course";
    const TEMPLATE: &'static str = "course_form.html";

    fn from_record(record: &Course) -> Self {
        Self { name: record.name.clone(), description: record.description.clone() }
    }

    async fn validate(
        &self,
        _store: &dyn Store,
        _existing: Option<i64>,
    ) -> Result<Validated<CourseData>, StoreError> {
        let mut errors = FormErrors::new();
        let name = required(&mut errors, "name", &self.name);
        Ok(match name {
            // description is optional
            Some(name) if errors.is_empty() => {
                Ok(CourseData { name, description: self.description.trim().to_string() })
            }
            _ => Err(errors),
        })
    }

    async fn load(store: &dyn Store, id: i64) -> Result<Option<Course>, StoreError> {
        store.course(id).await
    }

    async fn insert(store: &dyn Store, data: CourseData) -> Result<i64, StoreError> {
        store.insert_course(data).await
    }

    async fn update(store: &dyn Store, id: i64, data: CourseData) -> Result<(), StoreError> {
        store.update_course(id, data).await
    }
}

// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SemesterForm {
    pub year: String,
    pub term: String,
}

#[async_trait]
impl EntityForm for SemesterForm {
    type Record = Semester;
    type Data = SemesterData;

    const NOUN: &'static str = "semester";
    const TEMPLATE: &'static str = "semester_form.html";

    fn from_record(record: &Semester) -> Self {
        Self { year: record.year.to_string(), term: record.term.clone() }
    }

    async fn validate(
        &self,
        _store: &dyn Store,
        _existing: Option<i64>,
    ) -> Result<Validated<SemesterData>, StoreError> {
        let mut errors = FormErrors::new();
        let year = match required(&mut errors, "year", &self.year) {
            Some(raw) => match raw.parse::<i32>() {
                Ok(year) => Some(year),
                Err(_) => {
                    errors.insert("year".to_string(), INVALID_NUMBER.to_string());
                    None
                }
            },
            None => None,
        };
        let term = required(&mut errors, "term", &self.term);
        Ok(match (year, term) {
            (Some(year), Some(term)) if errors.is_empty() => Ok(SemesterData { year, term }),
            _ => Err(errors),
        })
    }

    async fn load(store: &dyn Store, id: i64) -> Result<Option<Semester>, StoreError> {
        store.semester(id).await
    }

    async fn insert(store: &dyn Store, data: SemesterData) -> Result<i64, StoreError> {
        store.insert_semester(data).await
    }

    async fn update(store: &dyn Store, id: i64, data: SemesterData) -> Result<(), StoreError> {
        store.update_semester(id, data).await
    }
}

// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SectionForm {
    pub name: String,
    pub course: String,
    pub semester: String,
    pub instructor: String,
}

#[async_trait]
impl EntityForm for SectionForm {
    type Record = Section;
    type Data = SectionData;

    const NOUN: &'static str = "section";
    const TEMPLATE: &'static str = "section_form.html";

    fn from_record(record: &Section) -> Self {
        Self {
            name: record.name.clone(),
            course: record.course_id.to_string(),
            semester: record.semester_id.to_string(),
            instructor: record.instructor_id.to_string(),
        }
    }

    async fn validate(
        &self,
        store: &dyn Store,
        _existing: Option<i64>,
    ) -> Result<Validated<SectionData>, StoreError> {
        let mut errors = FormErrors::new();
        let name = required(&mut errors, "name", &self.name);

        let course_id = match reference(&mut errors, "course", &self.course) {
            Some(id) => match store.course(id).await? {
                Some(_) => Some(id),
                None => {
                    invalid_choice(&mut errors, "course");
                    None
                }
            },
            None => None,
        };
        let semester_id = match reference(&mut errors, "semester", &self.semester) {
            Some(id) => match store.semester(id).await? {
                Some(_) => Some(id),
                None => {
                    invalid_choice(&mut errors, "semester");
                    None
                }
            },
            None => None,
        };
        let instructor_id = match reference(&mut errors, "instructor", &self.instructor) {
            Some(id) => match store.instructor(id).await? {
                Some(_) => Some(id),
                None => {
                    invalid_choice(&mut errors, "instructor");
                    None
                }
            },
            None => None,
        };

        Ok(match (name, course_id, semester_id, instructor_id) {
            (Some(name), Some(course_id), Some(semester_id), Some(instructor_id))
                if errors.is_empty() =>
            {
                Ok(SectionData { name, course_id, semester_id, instructor_id })
            }
            _ => Err(errors),
        })
    }

    async fn load(store: &dyn Store, id: i64) -> Result<Option<Section>, StoreError> {
        store.section(id).await
    }

    async fn insert(store: &dyn Store, data: SectionData) -> Result<i64, StoreError> {
        store.insert_section(data).await
    }

    async fn update(store: &dyn Store, id: i64, data: SectionData) -> Result<(), StoreError> {
        store.update_section(id, data).await
    }

    async fn choices(store: &dyn Store, ctx: &mut Context) -> Result<(), StoreError> {
        ctx.insert("course_list", &store.courses().await?);
        ctx.insert("semester_list", &store.semesters().await?);
        ctx.insert("instructor_list", &store.instructors().await?);
        Ok(())
    }
}

// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub student: String,
    pub section: String,
}

#[async_trait]
impl EntityForm for RegistrationForm {
    type Record = Registration;
    type Data = RegistrationData;

    const NOUN: &'static str = "registration";
    const TEMPLATE: &'static str = "registration_form.html";

    fn from_record(record: &Registration) -> Self {
        Self {
            student: record.student_id.to_string(),
            section: record.section_id.to_string(),
        }
    }

    async fn validate(
        &self,
        store: &dyn Store,
        existing: Option<i64>,
    ) -> Result<Validated<RegistrationData>, StoreError> {
        let mut errors = FormErrors::new();

        let student_id = match reference(&mut errors, "student", &self.student) {
            Some(id) => match store.student(id).await? {
                Some(_) => Some(id),
                None => {
                    invalid_choice(&mut errors, "student");
                    None
                }
            },
            None => None,
        };
        let section_id = match reference(&mut errors, "section", &self.section) {
            Some(id) => match store.section(id).await? {
                Some(_) => Some(id),
                None => {
                    invalid_choice(&mut errors, "section");
                    None
                }
            },
            None => None,
        };

        if let (Some(student_id), Some(section_id)) = (student_id, section_id) {
            // One registration per (student, section); updates may keep their own pair
            match store.find_registration(student_id, section_id).await? {
                Some(found) if Some(found) != existing => {
                    errors.insert("section".to_string(), DUPLICATE_REGISTRATION.to_string());
                }
                _ => {}
            }
            if errors.is_empty() {
                return Ok(Ok(RegistrationData { student_id, section_id }));
            }
        }
        Ok(Err(errors))
    }

    async fn load(store: &dyn Store, id: i64) -> Result<Option<Registration>, StoreError> {
        store.registration(id).await
    }

    async fn insert(store: &dyn Store, data: RegistrationData) -> Result<i64, StoreError> {
        store.insert_registration(data).await
    }

    async fn update(store: &dyn Store, id: i64, data: RegistrationData) -> Result<(), StoreError> {
        store.update_registration(id, data).await
    }

    async fn choices(store: &dyn Store, ctx: &mut Context) -> Result<(), StoreError> {
        ctx.insert("student_list", &store.students().await?);
        ctx.insert("section_list", &store.sections().await?);
        Ok(())
    }
}
