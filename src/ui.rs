use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use geo_metrics::{Dashboard, EntityType, IntensityBucket, SummaryMetrics, TableRow, ViewMode};
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
    Ranking,
    Views,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Ranking => Page::Views,
            Page::Views => Page::Ranking,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Ranking => "Top Revenue",
            Page::Views => "View Modes",
        }
    }
}

pub struct App {
    pub dashboard: Dashboard,
    pub rows: Vec<TableRow>,
    pub summary: SummaryMetrics,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        let mut app = Self {
            rows: Vec::new(),
            summary: SummaryMetrics::default(),
            dashboard,
            state: TableState::default(),
            current_page: Page::Ranking,
            show_detail: false,
        };
        app.refresh();
        app
    }

    /// Re-read table and totals from the current view
    fn refresh(&mut self) {
        self.rows = self.dashboard.table();
        self.summary = self.dashboard.summary();

        if self.rows.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.dashboard.set_view_mode(mode);
        self.current_page = Page::Ranking;
        self.refresh();
    }

    /// Treat the highlighted row as a map click
    pub fn click_selected(&mut self) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };

        let before = self.dashboard.view().selection.clone();
        self.dashboard.click(&row.name, row.entity_type);

        if self.dashboard.view().selection != before {
            self.refresh();
        }
    }

    pub fn reset(&mut self) {
        self.dashboard.reset();
        self.refresh();
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_row(&self) -> Option<&TableRow> {
        self.state.selected().and_then(|i| self.rows.get(i))
    }

    pub fn next(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
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
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                KeyCode::Enter => app.click_selected(),
                KeyCode::Char('d') => app.toggle_detail(),
                KeyCode::Char('r') => app.reset(),
                KeyCode::Tab => app.current_page = app.current_page.next(),
                KeyCode::Char('1') => app.set_view_mode(ViewMode::State),
                KeyCode::Char('2') => app.set_view_mode(ViewMode::District),
                KeyCode::Char('3') => app.set_view_mode(ViewMode::City),
                KeyCode::Char('4') => app.set_view_mode(ViewMode::Mixed),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home if !app.rows.is_empty() => app.state.select(Some(0)),
                KeyCode::End if !app.rows.is_empty() => {
                    app.state.select(Some(app.rows.len() - 1))
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with mode + totals
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Ranking {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Ranking => render_table(f, chunks[1], app),
            Page::Views => render_views(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn bucket_color(bucket: IntensityBucket) -> Color {
    match bucket {
        IntensityBucket::Highest => Color::Rgb(0x1b, 0x5e, 0x20),
        IntensityBucket::VeryHigh => Color::Rgb(0x2e, 0x7d, 0x32),
        IntensityBucket::High => Color::Rgb(0x43, 0xa0, 0x47),
        IntensityBucket::Medium => Color::Rgb(0x81, 0xc7, 0x84),
        IntensityBucket::Low => Color::Rgb(0xc8, 0xe6, 0xc9),
        IntensityBucket::NoData => Color::DarkGray,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let view = app.dashboard.view();

    let mut spans = vec![
        Span::styled(
            format!("{} ", app.current_page.title()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::styled(
            format!("Mode: {}", view.view_mode.title()),
            Style::default().fg(Color::Cyan),
        ),
    ];

    if let Some(state) = view.selected_state() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("▶ {}", state),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Revenue: {:.2}", app.summary.total_revenue),
        Style::default().fg(Color::Green),
    ));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("Colleges: {}", app.summary.total_colleges),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["#", "Name", "Type", "Revenue", "Colleges", "Growth", "Intensity"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.rows.iter().map(|row| {
        let color = bucket_color(row.bucket);

        let cells = vec![
            Cell::from(format!("{}", row.rank)),
            Cell::from(truncate(&row.name, 30)),
            Cell::from(row.entity_type.as_str()),
            Cell::from(format!("{:.2}", row.revenue)),
            Cell::from(format!("{}", row.colleges)),
            Cell::from(row.growth.clone()),
            Cell::from(format!("{:.1} {}", row.intensity, row.bucket)).style(Style::default().fg(color)),
        ];

        Row::new(cells).height(1)
    });

    let title = match app.dashboard.view().selected_state() {
        Some(state) => format!(" {} - Top {} ", state, app.rows.len()),
        None => format!(" Top {} by Revenue ", app.rows.len()),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(32),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_views(f: &mut Frame, area: Rect, app: &App) {
    let current = app.dashboard.view().view_mode;

    let mut lines = vec![Line::from(Span::styled(
        "Select a view mode:",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::from(""));

    for (i, mode) in ViewMode::ALL.iter().enumerate() {
        let marker = if *mode == current { "●" } else { "○" };
        let style = if *mode == current {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        lines.push(Line::from(vec![
            Span::styled(format!("  [{}] ", i + 1), Style::default().fg(Color::Cyan)),
            Span::styled(format!("{} {}", marker, mode.title()), style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter on a state row drills into it when it has more than one sub-region.",
        Style::default().fg(Color::DarkGray),
    )));

    let views = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Views "),
    );

    f.render_widget(views, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let lines = match app.selected_row() {
        None => vec![Line::from("No row selected")],
        Some(row) => {
            let label = |name: &str| Span::styled(format!("{:<10}", name), Style::default().fg(Color::Cyan));
            let mut lines = vec![
                Line::from(vec![label("Name"), Span::raw(row.name.clone())]),
                Line::from(vec![label("Type"), Span::raw(row.entity_type.as_str())]),
                Line::from(vec![label("Revenue"), Span::raw(format!("{:.2}", row.revenue))]),
                Line::from(vec![label("Colleges"), Span::raw(format!("{}", row.colleges))]),
                Line::from(vec![label("Growth"), Span::raw(row.growth.clone())]),
                Line::from(vec![
                    label("Intensity"),
                    Span::styled(
                        format!("{:.1} ({})", row.intensity, row.bucket),
                        Style::default().fg(bucket_color(row.bucket)),
                    ),
                ]),
            ];

            if row.entity_type == EntityType::State {
                let children = app.dashboard.controller().store().sub_region_count(&row.name);
                lines.push(Line::from(vec![label("Children"), Span::raw(format!("{}", children))]));
            }

            lines
        }
    };

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Details "),
    );

    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let status_spans = vec![
        Span::styled(
            format!(" Row: {}/{} ", selected, app.rows.len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        key("1-4"),
        Span::raw(" Mode | "),
        key("Enter"),
        Span::raw(" Drill | "),
        key("r"),
        Span::raw(" Reset | "),
        key("d"),
        Span::raw(" Details | "),
        key("Tab"),
        Span::raw(" Page | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

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
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_metrics::{DashboardConfig, GeoEntity};

    fn app() -> App {
        let entities = vec![
            GeoEntity::new("Rajasthan", EntityType::State).with_metrics(60.0, 2, 35.0),
            GeoEntity::new("Jaipur", EntityType::District)
                .with_parent("Rajasthan")
                .with_metrics(30.0, 2, 75.0),
            GeoEntity::new("Udaipur", EntityType::City)
                .with_parent("Rajasthan")
                .with_metrics(10.0, 1, 15.0),
        ];
        App::new(Dashboard::new(entities, &DashboardConfig::default()))
    }

    #[test]
    fn test_enter_on_state_row_drills_down() {
        let mut app = app();
        assert_eq!(app.rows.len(), 1);

        app.click_selected();
        assert_eq!(app.dashboard.view().selected_state(), Some("Rajasthan"));
        assert_eq!(app.rows.len(), 3);
        assert_eq!(app.summary.total_revenue, 60.0);

        app.reset();
        assert_eq!(app.dashboard.view().selected_state(), None);
        assert_eq!(app.rows.len(), 1);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        app.set_view_mode(ViewMode::Mixed);

        app.previous();
        assert_eq!(app.state.selected(), Some(2));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("Tamil Nadu", 30), "Tamil Nadu");
        assert_eq!(truncate("Thiruvananthapuram", 8), "Thiru...");
        assert_eq!(truncate("ಬೆಂಗಳೂರು ನಗರ", 6).chars().count(), 6);
    }
}
