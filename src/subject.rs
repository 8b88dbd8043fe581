// 📚 Subject - Course definition + per-student enrollment instance
//
// Same shape, two roles:
// - TEMPLATE: lives in the catalog, never carries grades
// - ENROLLMENT: a by-value copy owned by one student, accumulates grades

use crate::error::{require_text, GradeError, GradeResult};
use crate::grade::Grade;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    name: String,
    code: String,
    /// Weight for College GPA; ignored by numeric averaging
    pub credit_hours: u32,
    grades: Vec<Grade>,
}

impl Subject {
    pub fn new(name: &str, code: &str, credit_hours: u32) -> GradeResult<Self> {
        Ok(Subject {
            name: require_text("subject name", name)?,
            code: require_text("subject code", code)?,
            credit_hours,
            grades: Vec::new(),
        })
    }

    /// Build from signed credit hours (store / user input)
    pub fn with_signed_credit_hours(name: &str, code: &str, credit_hours: i64) -> GradeResult<Self> {
        let hours = u32::try_from(credit_hours)
            .map_err(|_| GradeError::InvalidCreditHours(credit_hours.to_string()))?;
        Subject::new(name, code, hours)
    }

    /// Parse credit hours typed by a user
    pub fn parse_credit_hours(input: &str) -> GradeResult<u32> {
        let trimmed = input.trim();
        trimmed
            .parse::<u32>()
            .map_err(|_| GradeError::InvalidCreditHours(trimmed.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    pub fn has_grades(&self) -> bool {
        !self.grades.is_empty()
    }

    /// Fresh enrollment instance: same name/code/credit hours, no grades
    pub fn enrollment_copy(&self) -> Subject {
        Subject {
            name: self.name.clone(),
            code: self.code.clone(),
            credit_hours: self.credit_hours,
            grades: Vec::new(),
        }
    }

    /// Append a grade. Descriptions are unique per subject, compared
    /// case-insensitively.
    pub fn add_grade(&mut self, grade: Grade) -> GradeResult<()> {
        let wanted = grade.description().to_lowercase();
        if self
            .grades
            .iter()
            .any(|g| g.description().to_lowercase() == wanted)
        {
            return Err(GradeError::DuplicateGrade(grade.description().to_string()));
        }

        self.grades.push(grade);
        Ok(())
    }

    /// Mean of all scores, 0.0 when there are none
    pub fn average_grade(&self) -> f64 {
        if self.grades.is_empty() {
            return 0.0;
        }
        let total: f64 = self.grades.iter().map(Grade::score).sum();
        total / self.grades.len() as f64
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} credits) - Avg Score/Point: {:.2}",
            self.name,
            self.code,
            self.credit_hours,
            self.average_grade()
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
