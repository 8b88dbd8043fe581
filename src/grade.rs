// 📝 Grade - One graded item inside a subject
//
// A grade is a VALUE: built once, never mutated.
// - HighSchool / generic students: score is a 0-100 mark
// - College students: score is a grade point (0.0-4.0) derived from a letter

use crate::error::{require_text, GradeError, GradeResult};
use std::fmt;

// ============================================================================
// LETTER GRADE TABLE
// ============================================================================

/// Letter → grade point mapping used for College grade input
pub const GRADE_POINTS: [(&str, f64); 11] = [
    ("A+", 4.0),
    ("A", 4.0),
    ("A-", 3.75),
    ("B+", 3.5),
    ("B", 3.0),
    ("B-", 2.75),
    ("C+", 2.5),
    ("C", 2.0),
    ("C-", 1.75),
    ("D", 1.5),
    ("F", 0.0),
];

/// Letter that marks a failed course
pub const FAILING_LETTER: &str = "F";

/// Comma-separated list of accepted letters, for prompts and errors
pub fn valid_letter_grades() -> String {
    GRADE_POINTS
        .iter()
        .map(|(letter, _)| *letter)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Look up the grade point for a letter (case-insensitive, trimmed)
///
/// Returns the canonical upper-case letter with its points.
pub fn grade_point_for(letter: &str) -> GradeResult<(&'static str, f64)> {
    let wanted = letter.trim().to_uppercase();
    GRADE_POINTS
        .iter()
        .find(|(l, _)| *l == wanted)
        .copied()
        .ok_or_else(|| GradeError::InvalidLetterGrade {
            given: letter.trim().to_string(),
            valid: valid_letter_grades(),
        })
}

// ============================================================================
// GRADE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    description: String,
    score: f64,
    letter_grade: Option<String>,
}

impl Grade {
    /// Create a grade. Range checks depend on the student variant and live
    /// in `Student::build_grade`; here only finiteness is enforced.
    pub fn new(description: &str, score: f64, letter_grade: Option<String>) -> GradeResult<Self> {
        let description = require_text("grade description", description)?;
        if !score.is_finite() {
            return Err(GradeError::NonFiniteScore(score));
        }

        Ok(Grade {
            description,
            score,
            letter_grade: letter_grade.filter(|l| !l.trim().is_empty()),
        })
    }

    /// Numeric mark without a letter
    pub fn numeric(description: &str, score: f64) -> GradeResult<Self> {
        Grade::new(description, score, None)
    }

    /// Letter grade, scored with its grade point
    pub fn from_letter(description: &str, letter: &str) -> GradeResult<Self> {
        let (canonical, points) = grade_point_for(letter)?;
        Grade::new(description, points, Some(canonical.to_string()))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn letter_grade(&self) -> Option<&str> {
        self.letter_grade.as_deref()
    }

    pub fn is_failing_letter(&self) -> bool {
        self.letter_grade() == Some(FAILING_LETTER)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.letter_grade {
            Some(letter) => write!(
                f,
                "{}: {} ({:.2} points)",
                self.description, letter, self.score
            ),
            None => write!(f, "{}: {:.2}", self.description, self.score),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_grade_display() {
        let grade = Grade::numeric("Midterm", 87.5).unwrap();
        assert_eq!(grade.to_string(), "Midterm: 87.50");
        assert_eq!(grade.letter_grade(), None);
    }

    #[test]
    fn test_letter_grade_display() {
        let grade = Grade::from_letter("Final", "b+").unwrap();
        assert_eq!(grade.to_string(), "Final: B+ (3.50 points)");
        assert_eq!(grade.letter_grade(), Some("B+"));
        assert_eq!(grade.score(), 3.5);
    }

    #[test]
    fn test_empty_description_rejected() {
        let err = Grade::numeric("  ", 50.0).unwrap_err();
        assert_eq!(err, GradeError::EmptyField("grade description"));
    }

    #[test]
    fn test_non_finite_score_rejected() {
        assert!(Grade::numeric("Quiz", f64::NAN).is_err());
        assert!(Grade::numeric("Quiz", f64::INFINITY).is_err());
    }

    #[test]
    fn test_unknown_letter_rejected() {
        let err = Grade::from_letter("Quiz", "E").unwrap_err();
        match err {
            GradeError::InvalidLetterGrade { given, valid } => {
                assert_eq!(given, "E");
                assert!(valid.starts_with("A+, A, A-"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_letter_treated_as_absent() {
        let grade = Grade::new("Lab", 3.0, Some(String::new())).unwrap();
        assert_eq!(grade.letter_grade(), None);
    }

    #[test]
    fn test_failing_letter_detection() {
        assert!(Grade::from_letter("Final", "f").unwrap().is_failing_letter());
        assert!(!Grade::from_letter("Final", "D").unwrap().is_failing_letter());
    }
}
