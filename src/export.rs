// 📤 CSV Export - Flat projection of the catalog
//
// One row per grade. Fallbacks:
// - subject with no grades   → one subject row
// - student with no subjects → one student row
// Pure read: the catalog is never touched.

use crate::catalog::Catalog;
use crate::student::{Student, Thresholds};
use crate::subject::Subject;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_HEADERS: [&str; 13] = [
    "student_id",
    "student_name",
    "student_type",
    "major",
    "subject_code",
    "subject_name",
    "subject_credit_hours",
    "grade_description",
    "grade_score_or_point",
    "letter_grade",
    "subject_average_or_gpa_points",
    "overall_average_mark_or_gpa",
    "status",
];

/// One CSV line. Field order must match `CSV_HEADERS`.
#[derive(Debug, Clone, Serialize)]
struct ExportRow<'a> {
    student_id: &'a str,
    student_name: &'a str,
    student_type: &'a str,
    major: Option<&'a str>,
    subject_code: Option<&'a str>,
    subject_name: Option<&'a str>,
    subject_credit_hours: Option<u32>,
    grade_description: Option<&'a str>,
    grade_score_or_point: Option<String>,
    letter_grade: Option<&'a str>,
    subject_average_or_gpa_points: Option<String>,
    overall_average_mark_or_gpa: String,
    status: &'static str,
}

impl<'a> ExportRow<'a> {
    fn for_student(student: &'a Student, thresholds: &Thresholds) -> Self {
        ExportRow {
            student_id: student.student_id(),
            student_name: student.name(),
            student_type: student.type_name(),
            major: student.major(),
            subject_code: None,
            subject_name: None,
            subject_credit_hours: None,
            grade_description: None,
            grade_score_or_point: None,
            letter_grade: None,
            subject_average_or_gpa_points: None,
            overall_average_mark_or_gpa: format!("{:.2}", student.overall_average()),
            status: student.standing(thresholds).as_str(),
        }
    }

    fn with_subject(mut self, subject: &'a Subject) -> Self {
        self.subject_code = Some(subject.code());
        self.subject_name = Some(subject.name());
        self.subject_credit_hours = Some(subject.credit_hours);
        self.subject_average_or_gpa_points = Some(format!("{:.2}", subject.average_grade()));
        self
    }
}

/// Write the CSV to any writer. Returns the number of data rows.
pub fn export_csv<W: Write>(catalog: &Catalog, thresholds: &Thresholds, writer: W) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(CSV_HEADERS)
        .context("Failed to write CSV header")?;

    let mut rows = 0;
    for student in catalog.students() {
        let base = ExportRow::for_student(student, thresholds);

        if student.subject_count() == 0 {
            wtr.serialize(&base).context("Failed to write CSV row")?;
            rows += 1;
            continue;
        }

        for subject in student.enrolled_subjects() {
            let subject_row = base.clone().with_subject(subject);

            if !subject.has_grades() {
                wtr.serialize(&subject_row).context("Failed to write CSV row")?;
                rows += 1;
                continue;
            }

            for grade in subject.grades() {
                let row = ExportRow {
                    grade_description: Some(grade.description()),
                    grade_score_or_point: Some(format!("{:.2}", grade.score())),
                    letter_grade: grade.letter_grade(),
                    ..subject_row.clone()
                };
                wtr.serialize(&row).context("Failed to write CSV row")?;
                rows += 1;
            }
        }
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(rows)
}

/// Append `.csv` when the name lacks it; blank input picks `default`
pub fn csv_export_path(input: &str, default: &Path) -> PathBuf {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return default.to_path_buf();
    }
    if trimmed.to_lowercase().ends_with(".csv") {
        PathBuf::from(trimmed)
    } else {
        PathBuf::from(format!("{trimmed}.csv"))
    }
}

pub fn export_csv_to_path(catalog: &Catalog, thresholds: &Thresholds, path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let rows = export_csv(catalog, thresholds, file)
        .with_context(|| format!("Failed to export CSV to {}", path.display()))?;

    info!("Exported {} rows to {}", rows, path.display());
    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::Grade;

    fn export_to_string(catalog: &Catalog) -> String {
        let mut buf = Vec::new();
        export_csv(catalog, &Thresholds::default(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn catalog_with_fallbacks() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add_subject_template(Subject::new("Mathematics", "MATH", 3).unwrap())
            .unwrap();
        catalog
            .add_subject_template(Subject::new("Physics", "PHYS", 4).unwrap())
            .unwrap();

        // two grades in one subject, one empty subject
        catalog
            .add_student(Student::college("Ada", "A1", "CS").unwrap())
            .unwrap();
        catalog.enroll_from_template("A1", "MATH", None).unwrap();
        catalog.enroll_from_template("A1", "PHYS", None).unwrap();
        catalog
            .add_grade("A1", "MATH", Grade::from_letter("Midterm", "B").unwrap())
            .unwrap();
        catalog
            .add_grade("A1", "MATH", Grade::from_letter("Final", "A").unwrap())
            .unwrap();

        // no subjects at all
        catalog
            .add_student(Student::high_school("Bo", "B1").unwrap())
            .unwrap();
        catalog
    }

    #[test]
    fn test_header_only_for_empty_catalog() {
        let csv = export_to_string(&Catalog::new());
        assert_eq!(csv.trim_end(), CSV_HEADERS.join(","));
    }

    #[test]
    fn test_row_fallbacks() {
        let catalog = catalog_with_fallbacks();
        let mut buf = Vec::new();
        let rows = export_csv(&catalog, &Thresholds::default(), &mut buf).unwrap();
        assert_eq!(rows, 4);

        let csv = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[1],
            "A1,Ada,CollegeStudent,CS,MATH,Mathematics,3,Midterm,3.00,B,3.50,3.50,Good Standing"
        );
        assert_eq!(
            lines[2],
            "A1,Ada,CollegeStudent,CS,MATH,Mathematics,3,Final,4.00,A,3.50,3.50,Good Standing"
        );
        assert_eq!(
            lines[3],
            "A1,Ada,CollegeStudent,CS,PHYS,Physics,4,,,,0.00,3.50,Good Standing"
        );
        assert_eq!(lines[4], "B1,Bo,HighSchoolStudent,,,,,,,,,0.00,Fail");
    }

    #[test]
    fn test_rows_parse_back_with_csv_reader() {
        let csv = export_to_string(&catalog_with_fallbacks());
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());

        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADERS.to_vec());
        assert_eq!(rdr.records().count(), 4);
    }

    #[test]
    fn test_export_path_normalisation() {
        let default = Path::new("gradeforge_export.csv");
        assert_eq!(csv_export_path("  ", default), PathBuf::from("gradeforge_export.csv"));
        assert_eq!(csv_export_path("term1", default), PathBuf::from("term1.csv"));
        assert_eq!(csv_export_path("Term1.CSV", default), PathBuf::from("Term1.CSV"));
    }

    #[test]
    fn test_export_to_path_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = export_csv_to_path(&catalog_with_fallbacks(), &Thresholds::default(), &path)
            .unwrap();
        assert_eq!(rows, 4);
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("student_id,"));
    }
}
