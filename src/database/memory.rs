use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::models::*;
use super::{Store, StoreError};

/// In-memory store backing tests and the `COURSEINFO_STORE=memory` demo
/// mode. Same contracts as [`super::PgStore`]: identifier-ordered
/// collections, referential checks on insert/update, unique
/// (student, section) registrations.
pub struct MemStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    accounts: BTreeMap<i64, Account>,
    instructors: BTreeMap<i64, Instructor>,
    students: BTreeMap<i64, Student>,
    courses: BTreeMap<i64, Course>,
    semesters: BTreeMap<i64, Semester>,
    sections: BTreeMap<i64, Section>,
    registrations: BTreeMap<i64, Registration>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_section_refs(&self, data: &SectionData) -> Result<(), StoreError> {
        if !self.courses.contains_key(&data.course_id) {
            return Err(StoreError::Conflict(format!("unknown course {}", data.course_id)));
        }
        if !self.semesters.contains_key(&data.semester_id) {
            return Err(StoreError::Conflict(format!("unknown semester {}", data.semester_id)));
        }
        if !self.instructors.contains_key(&data.instructor_id) {
            return Err(StoreError::Conflict(format!(
                "unknown instructor {}",
                data.instructor_id
            )));
        }
        Ok(())
    }

    fn check_registration_refs(&self, data: &RegistrationData) -> Result<(), StoreError> {
        if !self.students.contains_key(&data.student_id) {
            return Err(StoreError::Conflict(format!("unknown student {}", data.student_id)));
        }
        if !self.sections.contains_key(&data.section_id) {
            return Err(StoreError::Conflict(format!("unknown section {}", data.section_id)));
        }
        Ok(())
    }

    fn registration_row(&self, registration: &Registration) -> RegistrationRow {
        let student_name = self
            .students
            .get(&registration.student_id)
            .map(Student::display_name)
            .unwrap_or_default();
        let section_name = self
            .sections
            .get(&registration.section_id)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        RegistrationRow {
            registration_id: registration.registration_id,
            student_id: registration.student_id,
            section_id: registration.section_id,
            student_name,
            section_name,
        }
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner::default()) }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn authenticate(
        &self,
        username: &str,
        password_sha256: &str,
    ) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .values()
            .find(|a| a.username == username && a.password_sha256 == password_sha256)
            .cloned())
    }

    async fn insert_account(
        &self,
        username: &str,
        password_sha256: &str,
        permissions: &[String],
    ) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.accounts.values().any(|a| a.username == username) {
            return Err(StoreError::Conflict(format!("username {} taken", username)));
        }
        let id = inner.next_id();
        inner.accounts.insert(
            id,
            Account {
                account_id: id,
                username: username.to_string(),
                password_sha256: password_sha256.to_string(),
                permissions: permissions.to_vec(),
            },
        );
        Ok(id)
    }

    async fn instructors(&self) -> Result<Vec<Instructor>, StoreError> {
        Ok(self.inner.read().await.instructors.values().cloned().collect())
    }

    async fn instructor(&self, id: i64) -> Result<Option<Instructor>, StoreError> {
        Ok(self.inner.read().await.instructors.get(&id).cloned())
    }

    async fn insert_instructor(&self, data: InstructorData) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        inner.instructors.insert(
            id,
            Instructor {
                instructor_id: id,
                first_name: data.first_name,
                last_name: data.last_name,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update_instructor(&self, id: i64, data: InstructorData) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let record = inner.instructors.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.first_name = data.first_name;
        record.last_name = data.last_name;
        Ok(())
    }

    async fn sections_for_instructor(&self, instructor_id: i64) -> Result<Vec<Section>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sections
            .values()
            .filter(|s| s.instructor_id == instructor_id)
            .cloned()
            .collect())
    }

    async fn students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.inner.read().await.students.values().cloned().collect())
    }

    async fn student(&self, id: i64) -> Result<Option<Student>, StoreError> {
        Ok(self.inner.read().await.students.get(&id).cloned())
    }

    async fn insert_student(&self, data: StudentData) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        inner.students.insert(
            id,
            Student {
                student_id: id,
                first_name: data.first_name,
                last_name: data.last_name,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update_student(&self, id: i64, data: StudentData) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let record = inner.students.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.first_name = data.first_name;
        record.last_name = data.last_name;
        Ok(())
    }

    async fn registrations_for_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .registrations
            .values()
            .filter(|r| r.student_id == student_id)
            .map(|r| inner.registration_row(r))
            .collect())
    }

    async fn courses(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.inner.read().await.courses.values().cloned().collect())
    }

    async fn course(&self, id: i64) -> Result<Option<Course>, StoreError> {
        Ok(self.inner.read().await.courses.get(&id).cloned())
    }

    async fn insert_course(&self, data: CourseData) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        inner.courses.insert(
            id,
            Course {
                course_id: id,
                name: data.name,
                description: data.description,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update_course(&self, id: i64, data: CourseData) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let record = inner.courses.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.name = data.name;
        record.description = data.description;
        Ok(())
    }

    async fn sections_for_course(&self, course_id: i64) -> Result<Vec<Section>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sections
            .values()
            .filter(|s| s.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn semesters(&self) -> Result<Vec<Semester>, StoreError> {
        Ok(self.inner.read().await.semesters.values().cloned().collect())
    }

    async fn semester(&self, id: i64) -> Result<Option<Semester>, StoreError> {
        Ok(self.inner.read().await.semesters.get(&id).cloned())
    }

    async fn insert_semester(&self, data: SemesterData) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        inner.semesters.insert(
            id,
            Semester {
                semester_id: id,
                year: data.year,
                term: data.term,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update_semester(&self, id: i64, data: SemesterData) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let record = inner.semesters.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.year = data.year;
        record.term = data.term;
        Ok(())
    }

    async fn sections_for_semester(&self, semester_id: i64) -> Result<Vec<Section>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sections
            .values()
            .filter(|s| s.semester_id == semester_id)
            .cloned()
            .collect())
    }

    async fn sections(&self) -> Result<Vec<Section>, StoreError> {
        Ok(self.inner.read().await.sections.values().cloned().collect())
    }

    async fn section(&self, id: i64) -> Result<Option<Section>, StoreError> {
        Ok(self.inner.read().await.sections.get(&id).cloned())
    }

    async fn insert_section(&self, data: SectionData) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        inner.check_section_refs(&data)?;
        let id = inner.next_id();
        inner.sections.insert(
            id,
            Section {
                section_id: id,
                name: data.name,
                course_id: data.course_id,
                semester_id: data.semester_id,
                instructor_id: data.instructor_id,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update_section(&self, id: i64, data: SectionData) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.sections.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        inner.check_section_refs(&data)?;
        let record = inner.sections.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.name = data.name;
        record.course_id = data.course_id;
        record.semester_id = data.semester_id;
        record.instructor_id = data.instructor_id;
        Ok(())
    }

    async fn registrations_for_section(
        &self,
        section_id: i64,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .registrations
            .values()
            .filter(|r| r.section_id == section_id)
            .map(|r| inner.registration_row(r))
            .collect())
    }

    async fn registrations(&self) -> Result<Vec<RegistrationRow>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.registrations.values().map(|r| inner.registration_row(r)).collect())
    }

    async fn registration(&self, id: i64) -> Result<Option<Registration>, StoreError> {
        Ok(self.inner.read().await.registrations.get(&id).cloned())
    }

    async fn find_registration(
        &self,
        student_id: i64,
        section_id: i64,
    ) -> Result<Option<i64>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .registrations
            .values()
            .find(|r| r.student_id == student_id && r.section_id == section_id)
            .map(|r| r.registration_id))
    }

    async fn insert_registration(&self, data: RegistrationData) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        inner.check_registration_refs(&data)?;
        if inner
            .registrations
            .values()
            .any(|r| r.student_id == data.student_id && r.section_id == data.section_id)
        {
            return Err(StoreError::Conflict(format!(
                "student {} already registered for section {}",
                data.student_id, data.section_id
            )));
        }
        let id = inner.next_id();
        inner.registrations.insert(
            id,
            Registration {
                registration_id: id,
                student_id: data.student_id,
                section_id: data.section_id,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update_registration(&self, id: i64, data: RegistrationData) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.registrations.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        inner.check_registration_refs(&data)?;
        if inner.registrations.values().any(|r| {
            r.registration_id != id
                && r.student_id == data.student_id
                && r.section_id == data.section_id
        }) {
            return Err(StoreError::Conflict(format!(
                "student {} already registered for section {}",
                data.student_id, data.section_id
            )));
        }
        let record = inner.registrations.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.student_id = data.student_id;
        record.section_id = data.section_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemStore, i64, i64, i64, i64) {
        let store = MemStore::new();
        let instructor = store
            .insert_instructor(InstructorData {
                first_name: "Kate".into(),
                last_name: "Holden".into(),
            })
            .await
            .unwrap();
        let course = store
            .insert_course(CourseData {
                name: "IS 439".into(),
                description: "Web development".into(),
            })
            .await
            .unwrap();
        let semester = store
            .insert_semester(SemesterData { year: 2026, term: "Fall".into() })
            .await
            .unwrap();
        let section = store
            .insert_section(SectionData {
                name: "IS 439 AOG".into(),
                course_id: course,
                semester_id: semester,
                instructor_id: instructor,
            })
            .await
            .unwrap();
        (store, instructor, course, semester, section)
    }

    #[tokio::test]
    async fn collections_come_back_in_insertion_order() {
        let store = MemStore::new();
        for name in ["Able", "Baker", "Charlie"] {
            store
                .insert_instructor(InstructorData {
                    first_name: name.into(),
                    last_name: "Test".into(),
                })
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .instructors()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.first_name)
            .collect();
        assert_eq!(names, vec!["Able", "Baker", "Charlie"]);
    }

    #[tokio::test]
    async fn section_insert_rejects_dangling_references() {
        let (store, instructor, course, semester, _) = seeded().await;
        let err = store
            .insert_section(SectionData {
                name: "bad".into(),
                course_id: 9999,
                semester_id: semester,
                instructor_id: instructor,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // valid references still work
        store
            .insert_section(SectionData {
                name: "ok".into(),
                course_id: course,
                semester_id: semester,
                instructor_id: instructor,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let (store, _, _, _, section) = seeded().await;
        let student = store
            .insert_student(StudentData { first_name: "Ann".into(), last_name: "Lee".into() })
            .await
            .unwrap();
        store
            .insert_registration(RegistrationData { student_id: student, section_id: section })
            .await
            .unwrap();
        let err = store
            .insert_registration(RegistrationData { student_id: student, section_id: section })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_mutates_in_place_and_missing_id_is_not_found() {
        let (store, instructor, ..) = seeded().await;
        store
            .update_instructor(
                instructor,
                InstructorData { first_name: "Katherine".into(), last_name: "Holden".into() },
            )
            .await
            .unwrap();
        let record = store.instructor(instructor).await.unwrap().unwrap();
        assert_eq!(record.first_name, "Katherine");
        assert_eq!(record.instructor_id, instructor);

        let err = store
            .update_instructor(
                9999,
                InstructorData { first_name: "X".into(), last_name: "Y".into() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn registration_rows_carry_display_names() {
        let (store, _, _, _, section) = seeded().await;
        let student = store
            .insert_student(StudentData { first_name: "Ann".into(), last_name: "Lee".into() })
            .await
            .unwrap();
        store
            .insert_registration(RegistrationData { student_id: student, section_id: section })
            .await
            .unwrap();
        let rows = store.registrations_for_section(section).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_name, "Lee, Ann");
        assert_eq!(rows[0].section_name, "IS 439 AOG");
    }

    #[tokio::test]
    async fn authenticate_matches_username_and_digest() {
        let store = MemStore::new();
        store.insert_account("staff", "digest", &["course.view_course".into()]).await.unwrap();
        assert!(store.authenticate("staff", "digest").await.unwrap().is_some());
        assert!(store.authenticate("staff", "wrong").await.unwrap().is_none());
        assert!(store.authenticate("ghost", "digest").await.unwrap().is_none());
    }
}
