// 💾 Store - JSON persistence for the catalog
//
// Whole-file rewrite on save (temp file + rename).
// Lenient load: every template / student / subject / grade record is rebuilt
// on its own; a broken record is logged, collected as a warning and skipped.

use crate::catalog::Catalog;
use crate::grade::Grade;
use crate::student::{Student, StudentKind};
use crate::subject::Subject;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Credit hours assumed for records written before credit hours were stored
pub const LEGACY_CREDIT_HOURS: i64 = 3;

// ============================================================================
// FILE RECORDS
// ============================================================================
// Subject and student records are generic over their children so the same
// shape serves typed saving (children = records) and lenient loading
// (children = raw JSON text, parsed one by one). Raw text is only scanned
// for syntax, so an out-of-range number fails its own record, not the file.

#[derive(Debug, Serialize, Deserialize)]
struct DataFile<S, T, D> {
    #[serde(default = "BTreeMap::new")]
    students: BTreeMap<String, S>,

    #[serde(default = "BTreeMap::new")]
    available_subjects: BTreeMap<String, T>,

    /// When the file was written; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<D>,
}

type RawDataFile = DataFile<Box<RawValue>, Box<RawValue>, Box<RawValue>>;

#[derive(Debug, Serialize, Deserialize)]
struct StudentRecord<S> {
    name: String,

    #[serde(default)]
    student_id: String,

    #[serde(rename = "type", default = "default_student_type")]
    student_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    major: Option<String>,

    #[serde(default = "BTreeMap::new")]
    enrolled_subjects: BTreeMap<String, S>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubjectRecord<G> {
    name: String,
    code: String,

    #[serde(default = "legacy_credit_hours")]
    credit_hours: i64,

    /// Absent on templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grades: Option<Vec<G>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GradeRecord {
    description: String,
    score: f64,

    #[serde(default)]
    letter_grade: Option<String>,
}

fn default_student_type() -> String {
    "Student".to_string()
}

fn legacy_credit_hours() -> i64 {
    LEGACY_CREDIT_HOURS
}

// ============================================================================
// LOAD
// ============================================================================

/// Result of loading a data file: whatever could be rebuilt + what was skipped
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub catalog: Catalog,
    pub warnings: Vec<String>,
}

impl LoadOutcome {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Load a catalog from `path`.
///
/// A missing file or undecodable JSON yields an empty catalog (the latter with
/// a warning). Only an unreadable existing file is an error.
pub fn load(path: &Path) -> Result<LoadOutcome> {
    let mut outcome = LoadOutcome::default();

    if !path.exists() {
        info!("No data file at {}, starting empty", path.display());
        return Ok(outcome);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;

    let data: RawDataFile = match serde_json::from_str(&content) {
        Ok(data) => data,
        Err(e) => {
            outcome.warn(format!(
                "Could not decode JSON from {}: {}. Starting with an empty system.",
                path.display(),
                e
            ));
            return Ok(outcome);
        }
    };

    for (code, raw) in data.available_subjects {
        match rebuild_template(&raw) {
            Ok(template) => {
                if let Err(e) = outcome.catalog.add_subject_template(template) {
                    outcome.warn(format!("Could not load available subject {code}: {e}"));
                }
            }
            Err(e) => outcome.warn(format!("Could not load available subject {code}: {e:#}")),
        }
    }

    for (student_id, raw) in data.students {
        match rebuild_student(&student_id, &raw, &mut outcome) {
            Ok(student) => {
                if let Err(e) = outcome.catalog.add_student(student) {
                    outcome.warn(format!("Could not load student {student_id}: {e}"));
                }
            }
            Err(e) => outcome.warn(format!("Could not load student {student_id}: {e:#}")),
        }
    }

    info!(
        "Loaded {} students and {} subject templates from {} ({} warnings)",
        outcome.catalog.student_count(),
        outcome.catalog.template_count(),
        path.display(),
        outcome.warnings.len()
    );

    Ok(outcome)
}

fn rebuild_template(raw: &RawValue) -> Result<Subject> {
    let record: SubjectRecord<Box<RawValue>> =
        serde_json::from_str(raw.get()).context("malformed subject record")?;
    Ok(Subject::with_signed_credit_hours(
        &record.name,
        &record.code,
        record.credit_hours,
    )?)
}

/// Rebuild one student. Broken subjects/grades inside it are skipped with a
/// warning; only a broken student header fails the whole record.
fn rebuild_student(student_id: &str, raw: &RawValue, outcome: &mut LoadOutcome) -> Result<Student> {
    let record: StudentRecord<Box<RawValue>> =
        serde_json::from_str(raw.get()).context("malformed student record")?;
    let kind = StudentKind::from_type_name(&record.student_type, record.major.as_deref());
    let mut student = Student::new(&record.name, student_id, kind)?;

    for (code, raw_subject) in record.enrolled_subjects {
        let subject = match rebuild_enrollment(&raw_subject, student.name(), outcome) {
            Ok(subject) => subject,
            Err(e) => {
                outcome.warn(format!(
                    "Could not load enrolled subject {code} for student {}: {e:#}",
                    student.name()
                ));
                continue;
            }
        };
        if let Err(e) = student.enroll_subject(subject) {
            outcome.warn(format!(
                "Could not load enrolled subject {code} for student {}: {e}",
                student.name()
            ));
        }
    }

    Ok(student)
}

fn rebuild_enrollment(
    raw: &RawValue,
    student_name: &str,
    outcome: &mut LoadOutcome,
) -> Result<Subject> {
    let record: SubjectRecord<Box<RawValue>> =
        serde_json::from_str(raw.get()).context("malformed subject record")?;
    let mut subject =
        Subject::with_signed_credit_hours(&record.name, &record.code, record.credit_hours)?;

    for raw_grade in record.grades.unwrap_or_default() {
        let rebuilt = serde_json::from_str::<GradeRecord>(raw_grade.get())
            .context("malformed grade record")
            .and_then(|g| Ok(Grade::new(&g.description, g.score, g.letter_grade)?))
            .and_then(|grade| Ok(subject.add_grade(grade)?));
        if let Err(e) = rebuilt {
            outcome.warn(format!(
                "Could not load grade for {student_name} in {}: {e:#}",
                subject.name()
            ));
        }
    }

    Ok(subject)
}

// ============================================================================
// SAVE
// ============================================================================

fn subject_record(subject: &Subject, with_grades: bool) -> SubjectRecord<GradeRecord> {
    SubjectRecord {
        name: subject.name().to_string(),
        code: subject.code().to_string(),
        credit_hours: i64::from(subject.credit_hours),
        grades: with_grades.then(|| {
            subject
                .grades()
                .iter()
                .map(|g| GradeRecord {
                    description: g.description().to_string(),
                    score: g.score(),
                    letter_grade: g.letter_grade().map(str::to_string),
                })
                .collect()
        }),
    }
}

fn student_record(student: &Student) -> StudentRecord<SubjectRecord<GradeRecord>> {
    StudentRecord {
        name: student.name().to_string(),
        student_id: student.student_id().to_string(),
        student_type: student.type_name().to_string(),
        major: student.major().map(str::to_string),
        enrolled_subjects: student
            .enrolled_subjects()
            .map(|s| (s.code().to_string(), subject_record(s, true)))
            .collect(),
    }
}

/// Serialize the catalog as pretty JSON (4-space indent)
pub fn to_json(catalog: &Catalog) -> Result<String> {
    let data = DataFile {
        students: catalog
            .students()
            .map(|s| (s.student_id().to_string(), student_record(s)))
            .collect(),
        available_subjects: catalog
            .subject_templates()
            .map(|s| (s.code().to_string(), subject_record(s, false)))
            .collect(),
        saved_at: Some(Utc::now()),
    };

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut ser).context("Failed to serialize catalog")?;
    String::from_utf8(buf).context("Serialized catalog is not UTF-8")
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "gradeforge_data.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the catalog to `path`, replacing the previous file in one rename
pub fn save(catalog: &Catalog, path: &Path) -> Result<()> {
    let json = to_json(catalog)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let tmp = temp_path_for(path);
    {
        let mut file = fs::File::create(&tmp)
            .with_context(|| format!("Failed to create temp file: {}", tmp.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write temp file: {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to flush temp file: {}", tmp.display()))?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("Failed to replace data file: {}", path.display()));
    }

    info!(
        "Saved {} students and {} subject templates to {}",
        catalog.student_count(),
        catalog.template_count(),
        path.display()
    );
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
