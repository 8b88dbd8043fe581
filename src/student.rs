// 🎓 Student - Enrolled subjects + variant-specific scoring
//
// One struct, one tagged variant:
// - Generic / HighSchool: overall = unweighted mean of subject averages, Pass/Fail at 50
// - College: overall = credit-weighted GPA, four academic standing bands
//
// Every scoring/reporting branch point lives in this file.

use crate::error::{require_text, GradeError, GradeResult};
use crate::grade::Grade;
use crate::subject::Subject;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

/// Major assigned to College students who do not declare one
pub const UNDECLARED_MAJOR: &str = "Undeclared";

/// Width of the GPA band between Probation and Warning
pub const PROBATION_BAND: f64 = 0.5;

const RULE: &str = "------------------------------------";

// ============================================================================
// STUDENT KIND
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum StudentKind {
    /// Plain student, numeric marks
    Generic,

    /// High school student, numeric marks (0-100)
    HighSchool,

    /// College student, letter grades + GPA
    College { major: String },
}

impl StudentKind {
    /// Discriminator written to the data file and CSV
    pub fn type_name(&self) -> &'static str {
        match self {
            StudentKind::Generic => "Student",
            StudentKind::HighSchool => "HighSchoolStudent",
            StudentKind::College { .. } => "CollegeStudent",
        }
    }

    /// College kind with a blank major normalised to "Undeclared"
    pub fn college(major: &str) -> Self {
        let major = major.trim();
        StudentKind::College {
            major: if major.is_empty() {
                UNDECLARED_MAJOR.to_string()
            } else {
                major.to_string()
            },
        }
    }

    /// Rebuild from a discriminator; unknown names fall back to Generic
    pub fn from_type_name(type_name: &str, major: Option<&str>) -> Self {
        match type_name {
            "HighSchoolStudent" => StudentKind::HighSchool,
            "CollegeStudent" => StudentKind::college(major.unwrap_or(UNDECLARED_MAJOR)),
            _ => StudentKind::Generic,
        }
    }

    pub fn uses_letter_grades(&self) -> bool {
        matches!(self, StudentKind::College { .. })
    }
}

// ============================================================================
// STANDING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Pass,
    Fail,
    GoodStanding,
    AcademicProbation,
    AcademicWarning,
    /// College student holding at least one F
    Failing,
}

impl Standing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Standing::Pass => "Pass",
            Standing::Fail => "Fail",
            Standing::GoodStanding => "Good Standing",
            Standing::AcademicProbation => "Academic Probation",
            Standing::AcademicWarning => "Academic Warning",
            Standing::Failing => "Failing",
        }
    }

    /// Whether the standing needs attention (used for colouring in the browser)
    pub fn is_at_risk(&self) -> bool {
        !matches!(self, Standing::Pass | Standing::GoodStanding)
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cutoffs used for pass/fail and academic standing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum overall mark for "Pass" (generic / high school)
    pub pass_mark: f64,

    /// Minimum GPA for "Good Standing" (college)
    pub good_standing_gpa: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            pass_mark: 50.0,
            good_standing_gpa: 2.0,
        }
    }
}

// ============================================================================
// STUDENT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    name: String,
    student_id: String,
    kind: StudentKind,
    enrolled_subjects: BTreeMap<String, Subject>,
}

impl Student {
    pub fn new(name: &str, student_id: &str, kind: StudentKind) -> GradeResult<Self> {
        Ok(Student {
            name: require_text("student name", name)?,
            student_id: require_text("student ID", student_id)?,
            kind,
            enrolled_subjects: BTreeMap::new(),
        })
    }

    pub fn generic(name: &str, student_id: &str) -> GradeResult<Self> {
        Student::new(name, student_id, StudentKind::Generic)
    }

    pub fn high_school(name: &str, student_id: &str) -> GradeResult<Self> {
        Student::new(name, student_id, StudentKind::HighSchool)
    }

    pub fn college(name: &str, student_id: &str, major: &str) -> GradeResult<Self> {
        Student::new(name, student_id, StudentKind::college(major))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    /// Fixed at construction; grades already recorded depend on it
    pub fn kind(&self) -> &StudentKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn major(&self) -> Option<&str> {
        match &self.kind {
            StudentKind::College { major } => Some(major),
            _ => None,
        }
    }

    pub fn is_college(&self) -> bool {
        self.kind.uses_letter_grades()
    }

    /// Enrolled subjects, ordered by code
    pub fn enrolled_subjects(&self) -> impl Iterator<Item = &Subject> {
        self.enrolled_subjects.values()
    }

    pub fn enrolled_subject(&self, code: &str) -> Option<&Subject> {
        self.enrolled_subjects.get(code)
    }

    pub fn is_enrolled(&self, code: &str) -> bool {
        self.enrolled_subjects.contains_key(code)
    }

    pub fn subject_count(&self) -> usize {
        self.enrolled_subjects.len()
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Enroll in a subject instance. The first enrollment under a code wins.
    pub fn enroll_subject(&mut self, subject: Subject) -> GradeResult<()> {
        if self.enrolled_subjects.contains_key(subject.code()) {
            return Err(GradeError::AlreadyEnrolled {
                name: subject.name().to_string(),
                code: subject.code().to_string(),
            });
        }
        self.enrolled_subjects
            .insert(subject.code().to_string(), subject);
        Ok(())
    }

    pub fn add_grade_to_subject(&mut self, code: &str, grade: Grade) -> GradeResult<()> {
        self.enrolled_subjects
            .get_mut(code)
            .ok_or_else(|| GradeError::NotEnrolled(code.to_string()))?
            .add_grade(grade)
    }

    /// Build a grade from raw user input according to this student's variant.
    ///
    /// College: `input` is a letter grade. Others: `input` is a 0-100 mark.
    pub fn build_grade(&self, description: &str, input: &str) -> GradeResult<Grade> {
        if self.kind.uses_letter_grades() {
            return Grade::from_letter(description, input);
        }

        let trimmed = input.trim();
        let score: f64 = trimmed
            .parse()
            .map_err(|_| GradeError::NotANumber(trimmed.to_string()))?;
        if !(0.0..=100.0).contains(&score) {
            return Err(GradeError::ScoreOutOfRange(score));
        }
        Grade::numeric(description, score)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn subject_average(&self, code: &str) -> Option<f64> {
        self.enrolled_subjects.get(code).map(Subject::average_grade)
    }

    /// Variant-specific rollup: mean of subject averages, or GPA for College
    pub fn overall_average(&self) -> f64 {
        match self.kind {
            StudentKind::College { .. } => self.gpa(),
            StudentKind::Generic | StudentKind::HighSchool => self.mean_of_subject_averages(),
        }
    }

    /// Unweighted mean over subjects that have at least one grade
    fn mean_of_subject_averages(&self) -> f64 {
        let averages: Vec<f64> = self
            .enrolled_subjects
            .values()
            .filter(|s| s.has_grades())
            .map(Subject::average_grade)
            .collect();

        if averages.is_empty() {
            return 0.0;
        }
        averages.iter().sum::<f64>() / averages.len() as f64
    }

    /// Credit-weighted average of subject grade points.
    ///
    /// Zero-credit and ungraded subjects contribute to neither sum.
    pub fn gpa(&self) -> f64 {
        let (weighted_points, total_hours) = self
            .enrolled_subjects
            .values()
            .filter(|s| s.credit_hours > 0 && s.has_grades())
            .fold((0.0, 0u64), |(points, hours), s| {
                (
                    points + s.average_grade() * f64::from(s.credit_hours),
                    hours + u64::from(s.credit_hours),
                )
            });

        if total_hours == 0 {
            return 0.0;
        }
        weighted_points / total_hours as f64
    }

    pub fn check_for_f_grades(&self) -> bool {
        self.enrolled_subjects
            .values()
            .flat_map(Subject::grades)
            .any(Grade::is_failing_letter)
    }

    /// Standing with the default thresholds (50.0 mark / 2.0 GPA)
    pub fn pass_fail_status(&self) -> Standing {
        self.standing(&Thresholds::default())
    }

    pub fn standing(&self, thresholds: &Thresholds) -> Standing {
        match self.kind {
            StudentKind::College { .. } => {
                if self.check_for_f_grades() {
                    return Standing::Failing;
                }
                let gpa = self.gpa();
                let good = thresholds.good_standing_gpa;
                if gpa >= good {
                    Standing::GoodStanding
                } else if gpa >= good - PROBATION_BAND {
                    Standing::AcademicProbation
                } else {
                    Standing::AcademicWarning
                }
            }
            StudentKind::Generic | StudentKind::HighSchool => {
                if self.overall_average() >= thresholds.pass_mark {
                    Standing::Pass
                } else {
                    Standing::Fail
                }
            }
        }
    }

    // ========================================================================
    // REPORTS
    // ========================================================================

    pub fn generate_report(&self) -> String {
        self.report(&Thresholds::default())
    }

    pub fn report(&self, thresholds: &Thresholds) -> String {
        match &self.kind {
            StudentKind::College { major } => self.college_report(major, thresholds),
            StudentKind::Generic | StudentKind::HighSchool => self.numeric_report(thresholds),
        }
    }

    fn report_header(&self, out: &mut String) {
        // Writing into a String cannot fail
        let _ = writeln!(out, "Student Report");
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "ID: {}", self.student_id);
        let _ = writeln!(out, "Type: {}", self.type_name());
    }

    fn numeric_report(&self, thresholds: &Thresholds) -> String {
        let mut out = String::new();
        self.report_header(&mut out);
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Subjects Enrolled:");

        if self.enrolled_subjects.is_empty() {
            let _ = writeln!(out, "  No subjects enrolled.");
        }
        for subject in self.enrolled_subjects.values() {
            let _ = writeln!(
                out,
                "  - {} ({}): Average = {:.2}",
                subject.name(),
                subject.code(),
                subject.average_grade()
            );
            if subject.has_grades() {
                for grade in subject.grades() {
                    let _ = writeln!(out, "    - {grade}");
                }
            } else {
                let _ = writeln!(out, "    - No grades recorded.");
            }
        }

        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Overall Average: {:.2}", self.overall_average());
        let _ = writeln!(out, "Status: {}", self.standing(thresholds));
        let _ = writeln!(out, "{RULE}");
        out
    }

    fn college_report(&self, major: &str, thresholds: &Thresholds) -> String {
        let mut out = String::new();
        self.report_header(&mut out);
        let _ = writeln!(out, "Major: {major}");
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Subjects Enrolled:");

        if self.enrolled_subjects.is_empty() {
            let _ = writeln!(out, "  No subjects enrolled.");
        }
        for subject in self.enrolled_subjects.values() {
            let _ = writeln!(
                out,
                "  - {} ({}) - {} Credit Hours",
                subject.name(),
                subject.code(),
                subject.credit_hours
            );
            if subject.has_grades() {
                for grade in subject.grades() {
                    let _ = writeln!(out, "    - {grade}");
                }
                let _ = writeln!(
                    out,
                    "    Subject Average Points: {:.2}",
                    subject.average_grade()
                );
            } else {
                let _ = writeln!(out, "    - No grades recorded for this subject.");
            }
        }

        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Overall GPA: {:.2}", self.gpa());
        let _ = writeln!(out, "Academic Status: {}", self.standing(thresholds));
        if self.check_for_f_grades() {
            let _ = writeln!(out, "Note: Student has received an 'F' in one or more courses.");
        }
        let _ = writeln!(out, "{RULE}");
        out
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StudentKind::College { major } => write!(
                f,
                "College Student: {}, ID: {}, Major: {}, GPA: {:.2}",
                self.name,
                self.student_id,
                major,
                self.gpa()
            ),
            StudentKind::Generic | StudentKind::HighSchool => write!(
                f,
                "Student Name: {}, ID: {}, Overall Avg: {:.2}",
                self.name,
                self.student_id,
                self.overall_average()
            ),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Subject with the given numeric scores
    fn graded_subject(code: &str, credit_hours: u32, scores: &[f64]) -> Subject {
        let mut subject = Subject::new(&format!("Subject {code}"), code, credit_hours).unwrap();
        for (i, score) in scores.iter().enumerate() {
            subject
                .add_grade(Grade::numeric(&format!("Item {}", i + 1), *score).unwrap())
                .unwrap();
        }
        subject
    }

    /// Subject with the given letter grades
    fn lettered_subject(code: &str, credit_hours: u32, letters: &[&str]) -> Subject {
        let mut subject = Subject::new(&format!("Subject {code}"), code, credit_hours).unwrap();
        for (i, letter) in letters.iter().enumerate() {
            subject
                .add_grade(Grade::from_letter(&format!("Item {}", i + 1), letter).unwrap())
                .unwrap();
        }
        subject
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_kind_is_fixed_at_construction() {
        let student = Student::college("Ada", "C1", "  ").unwrap();
        assert_eq!(
            student.kind(),
            &StudentKind::College {
                major: UNDECLARED_MAJOR.to_string()
            }
        );
        assert_eq!(Student::high_school("Bo", "H1").unwrap().kind(), &StudentKind::HighSchool);
    }

    #[test]
    fn test_high_school_overall_is_unweighted_mean() {
        let mut student = Student::high_school("Ana", "HS1").unwrap();
        student.enroll_subject(graded_subject("S1", 4, &[80.0])).unwrap();
        student.enroll_subject(graded_subject("S2", 1, &[50.0, 70.0])).unwrap();

        assert_close(student.overall_average(), 70.0);
        assert_eq!(student.pass_fail_status(), Standing::Pass);
    }

    #[test]
    fn test_overall_ignores_ungraded_subjects() {
        let mut student = Student::generic("Ben", "G1").unwrap();
        student.enroll_subject(graded_subject("S1", 0, &[40.0])).unwrap();
        student.enroll_subject(graded_subject("S2", 0, &[])).unwrap();

        assert_close(student.overall_average(), 40.0);
        assert_eq!(student.pass_fail_status(), Standing::Fail);
    }

    #[test]
    fn test_overall_without_grades_is_zero() {
        let mut student = Student::generic("Ben", "G1").unwrap();
        assert_eq!(student.overall_average(), 0.0);
        student.enroll_subject(graded_subject("S1", 3, &[])).unwrap();
        assert_eq!(student.overall_average(), 0.0);
    }

    #[test]
    fn test_pass_threshold_is_inclusive() {
        let mut student = Student::high_school("Cy", "HS2").unwrap();
        student.enroll_subject(graded_subject("S1", 0, &[50.0])).unwrap();
        assert_eq!(student.pass_fail_status(), Standing::Pass);

        let strict = Thresholds {
            pass_mark: 60.0,
            ..Thresholds::default()
        };
        assert_eq!(student.standing(&strict), Standing::Fail);
    }

    #[test]
    fn test_college_gpa_is_credit_weighted() {
        let mut student = Student::college("Dee", "C1", "Physics").unwrap();
        student.enroll_subject(lettered_subject("A", 3, &["A"])).unwrap();
        student.enroll_subject(lettered_subject("B", 1, &["C"])).unwrap();

        assert_close(student.gpa(), 3.5);
        assert_close(student.overall_average(), 3.5);
        assert_eq!(student.pass_fail_status(), Standing::GoodStanding);
    }

    #[test]
    fn test_college_gpa_zero_without_credit_bearing_subjects() {
        let mut student = Student::college("Eve", "C2", "").unwrap();
        assert_eq!(student.gpa(), 0.0);

        student.enroll_subject(lettered_subject("SEM", 0, &["A"])).unwrap();
        assert_eq!(student.gpa(), 0.0);
        assert_eq!(student.major(), Some(UNDECLARED_MAJOR));
    }

    #[test]
    fn test_college_gpa_excludes_zero_credit_subjects() {
        let mut student = Student::college("Fay", "C3", "Art").unwrap();
        student.enroll_subject(lettered_subject("A", 2, &["B"])).unwrap();
        student.enroll_subject(lettered_subject("Z", 0, &["D"])).unwrap();

        assert_close(student.gpa(), 3.0);
    }

    #[test]
    fn test_f_grade_means_failing_regardless_of_gpa() {
        let mut student = Student::college("Gus", "C4", "Math").unwrap();
        student.enroll_subject(lettered_subject("A", 12, &["A", "A+"])).unwrap();
        student.enroll_subject(lettered_subject("B", 1, &["F"])).unwrap();

        assert!(student.gpa() > 3.5);
        assert!(student.check_for_f_grades());
        assert_eq!(student.pass_fail_status(), Standing::Failing);
    }

    #[test]
    fn test_college_standing_bands() {
        let standing_for = |letter: &str| {
            let mut student = Student::college("Hal", "C5", "Law").unwrap();
            student.enroll_subject(lettered_subject("A", 3, &[letter])).unwrap();
            student.pass_fail_status()
        };

        assert_eq!(standing_for("C"), Standing::GoodStanding); // 2.0
        assert_eq!(standing_for("C-"), Standing::AcademicProbation); // 1.75
        assert_eq!(standing_for("D"), Standing::AcademicProbation); // 1.5
        assert_eq!(
            {
                let mut student = Student::college("Hal", "C5", "Law").unwrap();
                student.enroll_subject(graded_subject("A", 3, &[1.49])).unwrap();
                student.pass_fail_status()
            },
            Standing::AcademicWarning
        );
    }

    #[test]
    fn test_duplicate_enrollment_rejected_first_kept() {
        let mut student = Student::high_school("Ivy", "HS3").unwrap();
        student.enroll_subject(graded_subject("MATH", 3, &[90.0])).unwrap();

        let second = Subject::new("Other Maths", "MATH", 1).unwrap();
        let err = student.enroll_subject(second).unwrap_err();
        assert!(matches!(err, GradeError::AlreadyEnrolled { .. }));

        let kept = student.enrolled_subject("MATH").unwrap();
        assert_eq!(kept.name(), "Subject MATH");
        assert_eq!(kept.grades().len(), 1);
    }

    #[test]
    fn test_add_grade_to_unknown_subject() {
        let mut student = Student::generic("Jo", "G2").unwrap();
        let err = student
            .add_grade_to_subject("NOPE", Grade::numeric("Quiz", 10.0).unwrap())
            .unwrap_err();
        assert_eq!(err, GradeError::NotEnrolled("NOPE".to_string()));
    }

    #[test]
    fn test_subject_average_lookup() {
        let mut student = Student::generic("Kim", "G3").unwrap();
        student.enroll_subject(graded_subject("BIO", 0, &[60.0, 80.0])).unwrap();
        assert_eq!(student.subject_average("BIO"), Some(70.0));
        assert_eq!(student.subject_average("CHEM"), None);
    }

    #[test]
    fn test_build_grade_follows_variant() {
        let hs = Student::high_school("Lu", "HS4").unwrap();
        assert_eq!(hs.build_grade("Quiz", " 88.5 ").unwrap().score(), 88.5);
        assert_eq!(
            hs.build_grade("Quiz", "101").unwrap_err(),
            GradeError::ScoreOutOfRange(101.0)
        );
        assert!(matches!(
            hs.build_grade("Quiz", "A").unwrap_err(),
            GradeError::NotANumber(_)
        ));

        let college = Student::college("Max", "C6", "CS").unwrap();
        let grade = college.build_grade("Essay", "a-").unwrap();
        assert_eq!(grade.letter_grade(), Some("A-"));
        assert_eq!(grade.score(), 3.75);
        assert!(college.build_grade("Essay", "85").is_err());
    }

    #[test]
    fn test_numeric_report_layout() {
        let mut student = Student::high_school("Nia", "HS5").unwrap();
        student.enroll_subject(graded_subject("ENG", 0, &[72.0])).unwrap();
        student.enroll_subject(graded_subject("ART", 0, &[])).unwrap();

        let report = student.generate_report();
        assert!(report.starts_with("Student Report\n"));
        assert!(report.contains("Type: HighSchoolStudent"));
        assert!(report.contains("  - Subject ENG (ENG): Average = 72.00"));
        assert!(report.contains("    - Item 1: 72.00"));
        assert!(report.contains("    - No grades recorded."));
        assert!(report.contains("Overall Average: 72.00"));
        assert!(report.contains("Status: Pass"));
    }

    #[test]
    fn test_college_report_layout() {
        let mut student = Student::college("Oz", "C7", "History").unwrap();
        student.enroll_subject(lettered_subject("HIS", 3, &["B+", "F"])).unwrap();

        let report = student.generate_report();
        assert!(report.contains("Major: History"));
        assert!(report.contains("  - Subject HIS (HIS) - 3 Credit Hours"));
        assert!(report.contains("    - Item 1: B+ (3.50 points)"));
        assert!(report.contains("    Subject Average Points: 1.75"));
        assert!(report.contains("Overall GPA: 1.75"));
        assert!(report.contains("Academic Status: Failing"));
        assert!(report.contains("Note: Student has received an 'F'"));
    }

    #[test]
    fn test_empty_report_mentions_no_subjects() {
        let student = Student::generic("Pat", "G4").unwrap();
        assert!(student.generate_report().contains("  No subjects enrolled."));
    }

    #[test]
    fn test_display_summaries() {
        let hs = Student::high_school("Quinn", "HS6").unwrap();
        assert_eq!(hs.to_string(), "Student Name: Quinn, ID: HS6, Overall Avg: 0.00");

        let college = Student::college("Rae", "C8", "Biology").unwrap();
        assert_eq!(
            college.to_string(),
            "College Student: Rae, ID: C8, Major: Biology, GPA: 0.00"
        );
    }

    #[test]
    fn test_kind_round_trips_through_type_name() {
        for kind in [
            StudentKind::Generic,
            StudentKind::HighSchool,
            StudentKind::college("Music"),
        ] {
            let rebuilt = StudentKind::from_type_name(kind.type_name(), Some("Music"));
            assert_eq!(rebuilt, kind);
        }
        assert_eq!(StudentKind::from_type_name("Alien", None), StudentKind::Generic);
    }
}
