// GradeForge - Core Library
// Exposes all modules for use in the CLI, the TUI browser, and tests

pub mod error;
pub mod grade;    // Grade records + letter/point table
pub mod subject;  // Subjects and their grade lists
pub mod student;  // Student kinds, averages, standing, reports
pub mod catalog;  // Registry of students + subject templates
pub mod store;    // JSON persistence
pub mod export;   // CSV export
pub mod config;
pub mod menu;     // Interactive console session

// Re-export commonly used types
pub use error::{GradeError, GradeResult};
pub use grade::{grade_point_for, valid_letter_grades, Grade, GRADE_POINTS};
pub use subject::Subject;
pub use student::{Standing, Student, StudentKind, Thresholds};
pub use catalog::Catalog;
pub use store::{load, save, to_json, LoadOutcome};
pub use export::{csv_export_path, export_csv, export_csv_to_path, CSV_HEADERS};
pub use config::Config;
pub use menu::Session;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
