// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use std::env;
use std::io::{self, Write};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gradeforge::{config::ENV_LOG, csv_export_path, export_csv_to_path, store, Catalog, Config, Session};

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let config = Config::from_env()?;
    let catalog = load_catalog(&config);

    match args.get(1).map(String::as_str) {
        None | Some("menu") => run_menu(catalog, config)?,
        Some("report") => run_report(&catalog, &config, args.get(2))?,
        Some("list") => run_list(&catalog, &config, &mut io::stdout().lock())?,
        Some("export") => run_export(&catalog, &config, args.get(2))?,
        Some("browse") => run_ui_mode(&catalog, &config)?,
        Some("--version") | Some("version") => println!("gradeforge {}", gradeforge::VERSION),
        Some(other) => {
            eprintln!("Unknown command: {other}");
            eprintln!("Usage: gradeforge [menu | report <student_id> | list | export [file.csv] | browse]");
            std::process::exit(2);
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = env::var(ENV_LOG)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// A data file that cannot be read at all still gives an empty catalog
fn load_catalog(config: &Config) -> Catalog {
    match store::load(&config.data_file) {
        Ok(outcome) => {
            if !outcome.warnings.is_empty() {
                warn!(
                    "{} record(s) skipped while loading {}",
                    outcome.warnings.len(),
                    config.data_file.display()
                );
            }
            outcome.catalog
        }
        Err(e) => {
            warn!("Starting with empty data: {e:#}");
            Catalog::new()
        }
    }
}

fn run_menu(catalog: Catalog, config: Config) -> Result<()> {
    info!(
        "Loaded {} students and {} subject templates",
        catalog.student_count(),
        catalog.template_count()
    );

    let stdin = io::stdin();
    let mut session = Session::new(catalog, config, stdin.lock(), io::stdout());
    session.run()
}

fn run_report(catalog: &Catalog, config: &Config, student_id: Option<&String>) -> Result<()> {
    let Some(student_id) = student_id else {
        eprintln!("Usage: gradeforge report <student_id>");
        std::process::exit(2);
    };

    match catalog.student(student_id.trim()) {
        Some(student) => println!("{}", student.report(&config.thresholds)),
        None => {
            eprintln!("Student with ID '{}' not found.", student_id.trim());
            std::process::exit(1);
        }
    }
    Ok(())
}

fn run_list<W: Write>(catalog: &Catalog, config: &Config, out: &mut W) -> Result<()> {
    if catalog.student_count() == 0 {
        writeln!(out, "No students in the system.")?;
        return Ok(());
    }

    for student in catalog.students() {
        writeln!(out, "{student}")?;
        writeln!(out, "  Status: {}", student.standing(&config.thresholds))?;
    }
    Ok(())
}

fn run_export(catalog: &Catalog, config: &Config, file: Option<&String>) -> Result<()> {
    let path = csv_export_path(file.map(String::as_str).unwrap_or(""), &config.export_file);
    let rows = export_csv_to_path(catalog, &config.thresholds, &path)?;
    println!("Exported {} rows to {}", rows, path.display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(catalog: &Catalog, config: &Config) -> Result<()> {
    if catalog.is_empty() {
        eprintln!("No students in the system.");
        eprintln!("   Run: gradeforge");
        eprintln!("   to add students first.");
        std::process::exit(1);
    }

    // Create and run app
    let mut app = ui::App::new(catalog, config.thresholds);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_catalog: &Catalog, _config: &Config) -> Result<()> {
    eprintln!("TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradeforge::{Student, Subject};

    fn list_output(catalog: &Catalog) -> String {
        let mut out = Vec::new();
        run_list(catalog, &Config::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_list_with_only_templates_reports_no_students() {
        let mut catalog = Catalog::new();
        catalog
            .add_subject_template(Subject::new("Mathematics", "MATH", 3).unwrap())
            .unwrap();

        assert_eq!(list_output(&catalog), "No students in the system.\n");
    }

    #[test]
    fn test_list_prints_summary_and_status() {
        let mut catalog = Catalog::new();
        catalog.add_student(Student::high_school("Bo", "H1").unwrap()).unwrap();

        let out = list_output(&catalog);
        assert!(out.contains("Student Name: Bo, ID: H1, Overall Avg: 0.00"));
        assert!(out.contains("  Status: Fail"));
    }
}
