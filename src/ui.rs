use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gradeforge::{Catalog, Standing, Student, StudentKind, Subject, Thresholds};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Subjects,
    Students,
    Views,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    All,
    HighSchool,
    College,
    Generic,
    AtRisk,
}

impl FilterType {
    fn label(&self) -> &'static str {
        match self {
            FilterType::All => "ALL",
            FilterType::HighSchool => "HIGH SCHOOL",
            FilterType::College => "COLLEGE",
            FilterType::Generic => "GENERIC",
            FilterType::AtRisk => "AT RISK",
        }
    }

    fn keeps(&self, student: &Student, thresholds: &Thresholds) -> bool {
        match self {
            FilterType::All => true,
            FilterType::HighSchool => *student.kind() == StudentKind::HighSchool,
            FilterType::College => student.is_college(),
            FilterType::Generic => *student.kind() == StudentKind::Generic,
            FilterType::AtRisk => student.standing(thresholds).is_at_risk(),
        }
    }
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Subjects => Page::Students,
            Page::Students => Page::Views,
            Page::Views => Page::Subjects,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Subjects => Page::Views,
            Page::Students => Page::Subjects,
            Page::Views => Page::Students,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Subjects => "Subject Templates",
            Page::Students => "Students",
            Page::Views => "Views",
        }
    }
}

pub struct App {
    pub students: Vec<Student>,
    pub filtered_students: Vec<Student>,
    pub templates: Vec<Subject>,
    pub thresholds: Thresholds,
    pub state: TableState,
    pub current_page: Page,
    pub subjects_state: TableState,
    pub show_detail: bool,
    pub active_filter: FilterType,
}

impl App {
    pub fn new(catalog: &Catalog, thresholds: Thresholds) -> Self {
        let students: Vec<Student> = catalog.students().cloned().collect();
        let templates: Vec<Subject> = catalog.subject_templates().cloned().collect();

        let mut state = TableState::default();
        if !students.is_empty() {
            state.select(Some(0));
        }

        let mut subjects_state = TableState::default();
        if !templates.is_empty() {
            subjects_state.select(Some(0));
        }

        Self {
            filtered_students: students.clone(),
            students,
            templates,
            thresholds,
            state,
            current_page: Page::Students,
            subjects_state,
            show_detail: false,
            active_filter: FilterType::All,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_student(&self) -> Option<&Student> {
        self.state.selected().and_then(|i| self.filtered_students.get(i))
    }

    pub fn apply_filter(&mut self, filter: FilterType) {
        self.active_filter = filter;
        self.filtered_students = self
            .students
            .iter()
            .filter(|s| filter.keeps(s, &self.thresholds))
            .cloned()
            .collect();

        if !self.filtered_students.is_empty() {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
    }

    pub fn clear_filter(&mut self) {
        self.apply_filter(FilterType::All);
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// Table driven by the arrow keys on the current page, with its row count
    fn active_table(&mut self) -> Option<(&mut TableState, usize)> {
        match self.current_page {
            Page::Students => Some((&mut self.state, self.filtered_students.len())),
            Page::Subjects => Some((&mut self.subjects_state, self.templates.len())),
            Page::Views => None,
        }
    }

    pub fn next(&mut self) {
        let Some((state, len)) = self.active_table() else {
            return;
        };
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let Some((state, len)) = self.active_table() else {
            return;
        };
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let Some((state, len)) = self.active_table() else {
            return;
        };
        if len == 0 {
            return;
        }
        let i = state.selected().map_or(0, |i| (i + 20).min(len - 1));
        state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let Some((state, len)) = self.active_table() else {
            return;
        };
        if len == 0 {
            return;
        }
        let i = state.selected().map_or(0, |i| i.saturating_sub(20));
        state.select(Some(i));
    }

    pub fn first(&mut self) {
        if let Some((state, len)) = self.active_table() {
            if len > 0 {
                state.select(Some(0));
            }
        }
    }

    pub fn last(&mut self) {
        if let Some((state, len)) = self.active_table() {
            if len > 0 {
                state.select(Some(len - 1));
            }
        }
    }

    pub fn stats(&self) -> StudentStats {
        let mut stats = StudentStats::default();

        for student in &self.students {
            match student.kind() {
                StudentKind::HighSchool => stats.high_school_count += 1,
                StudentKind::College { .. } => stats.college_count += 1,
                StudentKind::Generic => stats.generic_count += 1,
            }
            if student.standing(&self.thresholds).is_at_risk() {
                stats.at_risk_count += 1;
            }
        }

        stats
    }
}

#[derive(Default)]
pub struct StudentStats {
    pub high_school_count: usize,
    pub college_count: usize,
    pub generic_count: usize,
    pub at_risk_count: usize,
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('c') => {
                    app.clear_filter();
                    app.current_page = Page::Students;
                }
                KeyCode::Char(digit @ '1'..='5') if app.current_page == Page::Views => {
                    let filter = match digit {
                        '1' => FilterType::All,
                        '2' => FilterType::HighSchool,
                        '3' => FilterType::College,
                        '4' => FilterType::Generic,
                        _ => FilterType::AtRisk,
                    };
                    app.apply_filter(filter);
                    app.current_page = Page::Students;
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.first(),
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Students {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Subjects => render_subjects(f, chunks[1], app),
            Page::Students => render_table(f, chunks[1], app),
            Page::Views => render_views(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();

    let mut tab_spans = vec![];
    for (i, page) in [Page::Subjects, Page::Students, Page::Views].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Students: {}", app.students.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("At risk: {}", stats.at_risk_count),
        Style::default().fg(Color::Red),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn standing_color(standing: Standing) -> Color {
    match standing {
        Standing::Pass | Standing::GoodStanding => Color::Green,
        Standing::AcademicProbation => Color::Yellow,
        Standing::AcademicWarning => Color::Magenta,
        Standing::Fail | Standing::Failing => Color::Red,
    }
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1)
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header = header_row(&["ID", "Name", "Type", "Subjects", "Overall", "Status"]);

    let thresholds = app.thresholds;
    let rows = app.filtered_students.iter().map(|student| {
        let standing = student.standing(&thresholds);
        let color = standing_color(standing);
        let overall = if student.is_college() {
            format!("{:.2} GPA", student.overall_average())
        } else {
            format!("{:.2}", student.overall_average())
        };

        Row::new(vec![
            Cell::from(student.student_id().to_string()),
            Cell::from(truncate(student.name(), 24)),
            Cell::from(student.type_name()),
            Cell::from(student.subject_count().to_string()),
            Cell::from(overall).style(Style::default().fg(color)),
            Cell::from(standing.as_str()).style(Style::default().fg(color)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(26),
            Constraint::Length(19),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Students "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_subjects(f: &mut Frame, area: Rect, app: &mut App) {
    let header = header_row(&["Code", "Name", "Credit Hours", "Enrolled"]);

    let rows = app.templates.iter().map(|template| {
        let enrolled = app
            .students
            .iter()
            .filter(|s| s.is_enrolled(template.code()))
            .count();

        Row::new(vec![
            Cell::from(template.code().to_string()),
            Cell::from(truncate(template.name(), 30)),
            Cell::from(template.credit_hours.to_string()),
            Cell::from(enrolled.to_string()),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(32),
            Constraint::Length(14),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Subject Templates "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.subjects_state);
}

fn render_views(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();
    let entries = [
        (FilterType::All, "1", "All Students       ", app.students.len(), Color::White),
        (FilterType::HighSchool, "2", "High School        ", stats.high_school_count, Color::Cyan),
        (FilterType::College, "3", "College            ", stats.college_count, Color::Yellow),
        (FilterType::Generic, "4", "Generic            ", stats.generic_count, Color::White),
        (FilterType::AtRisk, "5", "At Risk            ", stats.at_risk_count, Color::Red),
    ];

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Quick Views & Filters",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (filter, key, label, count, color) in entries {
        let marker = if app.active_filter == filter {
            Span::styled("→", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            Span::raw(" ")
        };
        content.push(Line::from(vec![
            Span::raw("  "),
            marker,
            Span::styled(key, Style::default().fg(Color::Yellow)),
            Span::raw(format!(". {label}")),
            Span::styled(format!("{count:>5} students"), Style::default().fg(color)),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Press 1-5 to filter, c to clear",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Views - Quick Access Filters "),
    );

    f.render_widget(paragraph, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Student Report ");

    let Some(student) = app.selected_student() else {
        f.render_widget(Paragraph::new("No student selected").block(block), area);
        return;
    };

    let content: Vec<Line> = student
        .report(&app.thresholds)
        .lines()
        .map(|line| Line::from(format!("  {line}")))
        .collect();

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.filtered_students.len();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    if app.active_filter != FilterType::All {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Filter: {}", app.active_filter.label()),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    for (key, action, color) in [
        ("Enter", " Report | ", Color::Yellow),
        ("Tab", " Page | ", Color::Yellow),
        ("↑/↓", " Nav | ", Color::Yellow),
        ("PgUp/PgDn", " Fast | ", Color::Yellow),
        ("q", " Quit", Color::Red),
    ] {
        if key == "Enter" {
            status_spans.push(Span::raw(" | "));
        }
        status_spans.push(Span::styled(key, Style::default().fg(color)));
        status_spans.push(Span::raw(action));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut catalog = Catalog::new();
        catalog.add_student(Student::high_school("Ana", "H1").unwrap()).unwrap();
        catalog.add_student(Student::college("Ben", "C1", "CS").unwrap()).unwrap();
        catalog.add_student(Student::generic("Cy", "G1").unwrap()).unwrap();
        catalog
            .add_subject_template(Subject::new("Mathematics", "MATH", 3).unwrap())
            .unwrap();
        App::new(&catalog, Thresholds::default())
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        assert_eq!(app.state.selected(), Some(0));
        app.previous();
        assert_eq!(app.state.selected(), Some(2));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.page_down();
        assert_eq!(app.state.selected(), Some(2));
        app.page_up();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_navigation_follows_current_page() {
        let mut catalog = Catalog::new();
        catalog.add_student(Student::generic("Cy", "G1").unwrap()).unwrap();
        catalog.add_student(Student::generic("Di", "G2").unwrap()).unwrap();
        for code in ["ART", "BIO", "CHEM"] {
            catalog
                .add_subject_template(Subject::new(code, code, 3).unwrap())
                .unwrap();
        }
        let mut app = App::new(&catalog, Thresholds::default());

        app.current_page = Page::Subjects;
        app.next();
        app.next();
        assert_eq!(app.subjects_state.selected(), Some(2));
        app.first();
        assert_eq!(app.subjects_state.selected(), Some(0));
        app.last();
        assert_eq!(app.subjects_state.selected(), Some(2));
        // student selection is untouched
        assert_eq!(app.state.selected(), Some(0));

        app.current_page = Page::Views;
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        assert_eq!(app.subjects_state.selected(), Some(2));

        app.current_page = Page::Students;
        app.last();
        assert_eq!(app.state.selected(), Some(1));
    }

    #[test]
    fn test_filters() {
        let mut app = app();
        app.apply_filter(FilterType::College);
        assert_eq!(app.filtered_students.len(), 1);
        assert_eq!(app.selected_student().unwrap().student_id(), "C1");

        // nobody has grades: every student is below the bar
        app.apply_filter(FilterType::AtRisk);
        assert_eq!(app.filtered_students.len(), 3);

        app.clear_filter();
        assert_eq!(app.active_filter, FilterType::All);
        assert_eq!(app.active_filter.label(), "ALL");
        assert_eq!(app.filtered_students.len(), 3);
    }

    #[test]
    fn test_stats_and_pages() {
        let mut app = app();
        let stats = app.stats();
        assert_eq!(stats.high_school_count, 1);
        assert_eq!(stats.college_count, 1);
        assert_eq!(stats.generic_count, 1);

        app.next_page();
        assert_eq!(app.current_page, Page::Views);
        app.next_page();
        assert_eq!(app.current_page, Page::Subjects);
        app.previous_page();
        assert_eq!(app.current_page, Page::Views);
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Ñandú Ñandú Ñandú", 8), "Ñandú...");
    }
}
