// ⚠️ Error taxonomy for the data model
// Validation + lookup failures raised by Grade, Subject, Student and Catalog.
// Persistence and export use anyhow on top of these.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    /// A required text field was empty (after trimming)
    #[error("{0} must be a non-empty string")]
    EmptyField(&'static str),

    /// Score was NaN or infinite
    #[error("score must be a finite number, got {0}")]
    NonFiniteScore(f64),

    /// Numeric mark outside 0-100
    #[error("score must be between 0 and 100, got {0}")]
    ScoreOutOfRange(f64),

    /// Input could not be read as a number
    #[error("'{0}' is not a number")]
    NotANumber(String),

    /// Credit hours parsed from input were negative or not an integer
    #[error("credit hours must be a non-negative integer, got '{0}'")]
    InvalidCreditHours(String),

    #[error("invalid letter grade '{given}', expected one of: {valid}")]
    InvalidLetterGrade { given: String, valid: String },

    #[error("a grade with description '{0}' already exists for this subject")]
    DuplicateGrade(String),

    #[error("student already enrolled in {name} ({code})")]
    AlreadyEnrolled { name: String, code: String },

    #[error("subject with code {0} is not enrolled for this student")]
    NotEnrolled(String),

    #[error("student with ID {0} already exists")]
    DuplicateStudent(String),

    #[error("student with ID {0} not found")]
    StudentNotFound(String),

    #[error("subject template {0} already exists")]
    DuplicateTemplate(String),

    #[error("subject template {0} not found")]
    TemplateNotFound(String),
}

pub type GradeResult<T> = std::result::Result<T, GradeError>;

/// Rejects empty or whitespace-only text, returning the trimmed value
pub(crate) fn require_text(field: &'static str, value: &str) -> GradeResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GradeError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("name", "  Ada ").unwrap(), "Ada");
    }

    #[test]
    fn test_require_text_rejects_blank() {
        assert_eq!(
            require_text("name", "   ").unwrap_err(),
            GradeError::EmptyField("name")
        );
    }

    #[test]
    fn test_error_messages_read_naturally() {
        let err = GradeError::AlreadyEnrolled {
            name: "Mathematics".to_string(),
            code: "MATH101".to_string(),
        };
        assert_eq!(err.to_string(), "student already enrolled in Mathematics (MATH101)");
    }
}
