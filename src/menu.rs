// 🧭 Interactive Menu - Numbered command loop over a Catalog
//
// Generic over input/output so whole sessions can be scripted in tests.
// Every command commits immediately; there is no undo. End of input behaves
// like choosing "0. Exit".

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::GradeError;
use crate::export::{csv_export_path, export_csv_to_path};
use crate::grade::valid_letter_grades;
use crate::store;
use crate::student::{Student, StudentKind};
use crate::subject::Subject;
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::debug;

const BANNER: &str = "========================================";

pub struct Session<R, W> {
    pub catalog: Catalog,
    config: Config,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(catalog: Catalog, config: Config, input: R, out: W) -> Self {
        Session {
            catalog,
            config,
            input,
            out,
        }
    }

    /// Consume the session, handing back the writer (used by tests)
    pub fn into_output(self) -> W {
        self.out
    }

    // ========================================================================
    // MAIN LOOP
    // ========================================================================

    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "Welcome to GradeForge - Student Grade Management System!")?;

        loop {
            self.print_menu()?;
            let choice = match self.prompt("Enter your choice: ")? {
                Some(choice) => choice,
                None => "0".to_string(),
            };
            debug!("menu choice: {}", choice);

            let result = match choice.as_str() {
                "1" => self.add_student(),
                "2" => self.assign_subject_to_student(),
                "3" => self.input_grades_for_subject(),
                "4" => self.performance_summary(),
                "5" => self.student_report(),
                "6" => self.list_students(),
                "7" => self.list_subject_templates(),
                "8" => self.export_csv(),
                "9" => self.save(),
                "10" => self.delete_student(),
                "0" => {
                    writeln!(self.out, "Saving data before exiting...")?;
                    self.save()?;
                    writeln!(self.out, "Exiting GradeForge. Goodbye!")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.out, "Invalid choice. Please try again.")?;
                    Ok(())
                }
            };

            if let Err(e) = result {
                writeln!(self.out, "Error: {e:#}")?;
            }
        }
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.out, "\n{BANNER}")?;
        writeln!(self.out, "Main Menu:")?;
        for line in [
            "1. Add New Student",
            "2. Assign Subject to Student",
            "3. Input Grades for Subject",
            "4. View Student Performance Summary",
            "5. Generate Full Student Report",
            "6. List All Students",
            "7. List Available Subjects (Templates)",
            "8. Export All Data to CSV",
            "9. Save Data",
            "10. Delete Student",
            "0. Exit",
        ] {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out, "{BANNER}")?;
        Ok(())
    }

    /// Print `message`, read one trimmed line. `None` at end of input.
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.out, "{message}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask for a student id and return it if the student exists
    fn select_student(&mut self) -> Result<Option<String>> {
        if self.catalog.student_count() == 0 {
            writeln!(self.out, "No students in the system yet.")?;
            return Ok(None);
        }
        let Some(student_id) = self.prompt("Enter student ID: ")? else {
            return Ok(None);
        };
        if self.catalog.student(&student_id).is_none() {
            writeln!(self.out, "Student with ID {student_id} not found.")?;
            return Ok(None);
        }
        Ok(Some(student_id))
    }

    fn require_student(&self, student_id: &str) -> Result<&Student> {
        self.catalog
            .student(student_id)
            .ok_or_else(|| GradeError::StudentNotFound(student_id.to_string()).into())
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    fn add_student(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Add New Student ---")?;
        let Some(name) = self.prompt("Enter student name: ")? else {
            return Ok(());
        };
        let Some(student_id) = self.prompt("Enter student ID: ")? else {
            return Ok(());
        };
        let Some(kind_choice) = self.prompt(
            "Enter student type (1: High School, 2: College, Enter for Generic Student): ",
        )?
        else {
            return Ok(());
        };

        if name.is_empty() || student_id.is_empty() {
            writeln!(self.out, "Error: Student name and ID cannot be empty.")?;
            return Ok(());
        }
        if self.catalog.student(&student_id).is_some() {
            writeln!(self.out, "Error: Student with ID {student_id} already exists.")?;
            return Ok(());
        }

        let kind = match kind_choice.as_str() {
            "1" => StudentKind::HighSchool,
            "2" => {
                let major = self
                    .prompt("Enter college student's major (e.g., Computer Science): ")?
                    .unwrap_or_default();
                StudentKind::college(&major)
            }
            _ => StudentKind::Generic,
        };

        let student = Student::new(&name, &student_id, kind)?;
        let type_name = student.type_name();
        self.catalog.add_student(student)?;
        writeln!(
            self.out,
            "Student {name} ({student_id}) added successfully as {type_name}."
        )?;
        Ok(())
    }

    /// Look up a template by code, offering to create it when missing
    fn pick_template(&mut self) -> Result<Option<String>> {
        if self.catalog.template_count() == 0 {
            writeln!(self.out, "No subjects globally available yet.")?;
        } else {
            writeln!(self.out, "Available subjects (templates):")?;
            let lines: Vec<String> = self
                .catalog
                .subject_templates()
                .map(|s| format!("  {}: {} ({} credits)", s.code(), s.name(), s.credit_hours))
                .collect();
            for line in lines {
                writeln!(self.out, "{line}")?;
            }
        }

        let Some(code) = self.prompt("Enter subject code: ")? else {
            return Ok(None);
        };
        let code = code.to_uppercase();
        if self.catalog.subject_template(&code).is_some() {
            return Ok(Some(code));
        }

        let create = self
            .prompt(&format!(
                "Subject with code {code} not found. Create new global template? (y/n): "
            ))?
            .unwrap_or_default();
        if !create.eq_ignore_ascii_case("y") {
            return Ok(None);
        }

        let name = self
            .prompt(&format!("Enter name for subject {code}: "))?
            .unwrap_or_default();
        if name.is_empty() {
            writeln!(self.out, "Subject name cannot be empty.")?;
            return Ok(None);
        }

        self.catalog.add_subject_template(Subject::new(&name, &code, 0)?)?;
        writeln!(self.out, "Subject template {name} ({code}) created.")?;
        Ok(Some(code))
    }

    fn assign_subject_to_student(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Assign Subject to Student ---")?;
        let Some(student_id) = self.select_student()? else {
            return Ok(());
        };
        let (student_name, is_college) = {
            let student = self.require_student(&student_id)?;
            (student.name().to_string(), student.is_college())
        };
        writeln!(self.out, "Assigning subject to {student_name} ({student_id}).")?;

        let Some(code) = self.pick_template()? else {
            return Ok(());
        };

        let mut credit_hours = None;
        if is_college {
            loop {
                let Some(raw) = self.prompt(&format!(
                    "Enter credit hours for {code} for {student_name} (e.g., 3): "
                ))?
                else {
                    return Ok(());
                };
                match Subject::parse_credit_hours(&raw) {
                    Ok(hours) => {
                        credit_hours = Some(hours);
                        break;
                    }
                    Err(e) => writeln!(self.out, "{e}. Please try again.")?,
                }
            }
        }

        self.catalog
            .enroll_from_template(&student_id, &code, credit_hours)?;
        let hours = self
            .catalog
            .student(&student_id)
            .and_then(|s| s.enrolled_subject(&code))
            .map(|s| s.credit_hours)
            .unwrap_or_default();
        writeln!(
            self.out,
            "Subject {code} ({hours} credits used if College) assigned to {student_name}."
        )?;
        Ok(())
    }

    fn input_grades_for_subject(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Input Grades for Subject ---")?;
        let Some(student_id) = self.select_student()? else {
            return Ok(());
        };
        let student = self.require_student(&student_id)?.clone();

        if student.subject_count() == 0 {
            writeln!(self.out, "{} is not enrolled in any subjects.", student.name())?;
            return Ok(());
        }
        writeln!(self.out, "Enrolled subjects for {}:", student.name())?;
        for subject in student.enrolled_subjects() {
            writeln!(
                self.out,
                "  {}: {} ({} credits)",
                subject.code(),
                subject.name(),
                subject.credit_hours
            )?;
        }

        let Some(code) = self.prompt("Enter subject code to add grades for: ")? else {
            return Ok(());
        };
        let code = code.to_uppercase();
        if !student.is_enrolled(&code) {
            writeln!(
                self.out,
                "Error: {} is not enrolled in subject {code}.",
                student.name()
            )?;
            return Ok(());
        }

        loop {
            let Some(description) = self.prompt(
                "Enter grade description (e.g., Midterm, Assignment 1) or 'done' to finish: ",
            )?
            else {
                return Ok(());
            };
            if description.eq_ignore_ascii_case("done") {
                return Ok(());
            }
            if description.is_empty() {
                writeln!(self.out, "Grade description cannot be empty.")?;
                continue;
            }

            let grade = loop {
                let question = if student.is_college() {
                    format!(
                        "Enter letter grade for '{description}' ({}): ",
                        valid_letter_grades()
                    )
                } else {
                    format!("Enter numeric score for '{description}' (0-100): ")
                };
                let Some(raw) = self.prompt(&question)? else {
                    return Ok(());
                };
                match student.build_grade(&description, &raw) {
                    Ok(grade) => break grade,
                    Err(e) => writeln!(self.out, "{e}. Please try again.")?,
                }
            };

            let shown = grade.to_string();
            match self.catalog.add_grade(&student_id, &code, grade) {
                Ok(()) => writeln!(self.out, "Grade '{shown}' added to {code}.")?,
                Err(e) => writeln!(self.out, "Error processing grade: {e}. Please try again.")?,
            }
        }
    }

    fn performance_summary(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Calculate Student Performance ---")?;
        let Some(student_id) = self.select_student()? else {
            return Ok(());
        };
        let thresholds = self.config.thresholds;
        let Some(student) = self.catalog.student(&student_id) else {
            return Ok(());
        };

        writeln!(
            self.out,
            "\nPerformance Summary for {} ({} - {}):",
            student.name(),
            student.student_id(),
            student.type_name()
        )?;
        if student.subject_count() == 0 {
            writeln!(self.out, "No subjects enrolled.")?;
            return Ok(());
        }

        if student.is_college() {
            writeln!(self.out, "  Overall GPA: {:.2}", student.gpa())?;
            writeln!(self.out, "  Academic Status: {}", student.standing(&thresholds))?;
            if student.check_for_f_grades() {
                writeln!(self.out, "  Alert: Student has one or more 'F' grades.")?;
            }
            writeln!(
                self.out,
                "  For detailed subject grades, please use the 'Generate Student Report' option."
            )?;
            return Ok(());
        }

        for subject in student.enrolled_subjects() {
            writeln!(
                self.out,
                "  Subject: {} ({}) - Average Mark: {:.2}",
                subject.name(),
                subject.code(),
                subject.average_grade()
            )?;
            if subject.has_grades() {
                for grade in subject.grades() {
                    writeln!(self.out, "      - {grade}")?;
                }
            } else {
                writeln!(self.out, "    No grades recorded for this subject.")?;
            }
        }
        writeln!(self.out, "\n  Overall Average Mark: {:.2}", student.overall_average())?;
        writeln!(self.out, "  Status: {}", student.standing(&thresholds))?;
        Ok(())
    }

    fn student_report(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Generate Student Report ---")?;
        let Some(student_id) = self.select_student()? else {
            return Ok(());
        };
        if let Some(student) = self.catalog.student(&student_id) {
            let report = student.report(&self.config.thresholds);
            writeln!(self.out, "{report}")?;
        }
        Ok(())
    }

    fn list_students(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- All Students ---")?;
        if self.catalog.student_count() == 0 {
            writeln!(self.out, "No students in the system.")?;
            return Ok(());
        }
        for student in self.catalog.students() {
            writeln!(self.out, "- {student}")?;
        }
        Ok(())
    }

    fn list_subject_templates(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Available Subjects (Templates) ---")?;
        if self.catalog.template_count() == 0 {
            writeln!(self.out, "No subjects defined in the system yet.")?;
            return Ok(());
        }
        for subject in self.catalog.subject_templates() {
            writeln!(self.out, "- {subject}")?;
        }
        Ok(())
    }

    fn export_csv(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Export Data to CSV ---")?;
        if self.catalog.student_count() == 0 {
            writeln!(self.out, "No student data to export.")?;
            return Ok(());
        }

        let question = format!(
            "Enter CSV filename (e.g., {}): ",
            self.config.export_file.display()
        );
        let name = self.prompt(&question)?.unwrap_or_default();
        let path = csv_export_path(&name, &self.config.export_file);

        export_csv_to_path(&self.catalog, &self.config.thresholds, &path)?;
        writeln!(self.out, "Data exported successfully to {}", path.display())?;
        Ok(())
    }

    /// Save failures are reported, never fatal
    fn save(&mut self) -> Result<()> {
        match store::save(&self.catalog, &self.config.data_file) {
            Ok(()) => writeln!(
                self.out,
                "Data saved successfully to {}",
                self.config.data_file.display()
            )?,
            Err(e) => writeln!(self.out, "Error saving data: {e:#}")?,
        }
        Ok(())
    }

    fn delete_student(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Delete Student ---")?;
        let Some(student_id) = self.select_student()? else {
            return Ok(());
        };
        let name = self
            .catalog
            .student(&student_id)
            .map(|s| s.name().to_string())
            .unwrap_or_default();

        let confirm = self
            .prompt(&format!(
                "Are you sure you want to delete student {name} (ID: {student_id})? This action cannot be undone. (y/n): "
            ))?
            .unwrap_or_default();
        if !confirm.eq_ignore_ascii_case("y") {
            writeln!(self.out, "Student deletion cancelled.")?;
            return Ok(());
        }

        self.catalog.remove_student(&student_id)?;
        writeln!(self.out, "Student {name} (ID: {student_id}) has been deleted.")?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
