// 🗂️ Catalog - Students + subject templates
//
// The single owned piece of session state. Passed by reference to the menu,
// the store and the exporter; nothing global.
//
// Enrollment COPIES a template into the student. Later template edits never
// reach existing enrollments.

use crate::error::{GradeError, GradeResult};
use crate::grade::Grade;
use crate::student::Student;
use crate::subject::Subject;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// student_id → Student
    students: BTreeMap<String, Student>,

    /// code → template Subject (never carries grades)
    available_subjects: BTreeMap<String, Subject>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty() && self.available_subjects.is_empty()
    }

    // ========================================================================
    // STUDENTS
    // ========================================================================

    pub fn add_student(&mut self, student: Student) -> GradeResult<()> {
        if self.students.contains_key(student.student_id()) {
            return Err(GradeError::DuplicateStudent(student.student_id().to_string()));
        }
        self.students
            .insert(student.student_id().to_string(), student);
        Ok(())
    }

    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.get(student_id)
    }

    pub fn student_mut(&mut self, student_id: &str) -> GradeResult<&mut Student> {
        self.students
            .get_mut(student_id)
            .ok_or_else(|| GradeError::StudentNotFound(student_id.to_string()))
    }

    pub fn remove_student(&mut self, student_id: &str) -> GradeResult<Student> {
        self.students
            .remove(student_id)
            .ok_or_else(|| GradeError::StudentNotFound(student_id.to_string()))
    }

    /// Students ordered by id
    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    // ========================================================================
    // SUBJECT TEMPLATES
    // ========================================================================

    /// Register a template. Any grades on the passed subject are dropped.
    pub fn add_subject_template(&mut self, subject: Subject) -> GradeResult<()> {
        if self.available_subjects.contains_key(subject.code()) {
            return Err(GradeError::DuplicateTemplate(subject.code().to_string()));
        }
        let template = subject.enrollment_copy();
        self.available_subjects
            .insert(template.code().to_string(), template);
        Ok(())
    }

    pub fn subject_template(&self, code: &str) -> Option<&Subject> {
        self.available_subjects.get(code)
    }

    pub fn subject_template_mut(&mut self, code: &str) -> Option<&mut Subject> {
        self.available_subjects.get_mut(code)
    }

    pub fn subject_templates(&self) -> impl Iterator<Item = &Subject> {
        self.available_subjects.values()
    }

    pub fn template_count(&self) -> usize {
        self.available_subjects.len()
    }

    // ========================================================================
    // ENROLLMENT + GRADES
    // ========================================================================

    /// Copy a template into a student's enrollments.
    ///
    /// `credit_hours` overrides the template's value for this enrollment only.
    pub fn enroll_from_template(
        &mut self,
        student_id: &str,
        code: &str,
        credit_hours: Option<u32>,
    ) -> GradeResult<()> {
        let mut enrollment = self
            .available_subjects
            .get(code)
            .ok_or_else(|| GradeError::TemplateNotFound(code.to_string()))?
            .enrollment_copy();
        if let Some(hours) = credit_hours {
            enrollment.credit_hours = hours;
        }

        self.student_mut(student_id)?.enroll_subject(enrollment)
    }

    pub fn add_grade(&mut self, student_id: &str, code: &str, grade: Grade) -> GradeResult<()> {
        self.student_mut(student_id)?.add_grade_to_subject(code, grade)
    }
}

// ============================================================================
// TESTS
// ============================================================================
