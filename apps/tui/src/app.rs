//! Viewer state and event loop.

use std::io;
use std::path::Path;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use docview_outline::{Navigator, Outline, OutlineSource, RowKind, SidebarRow};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tracing::{debug, info};

use crate::widgets::{nav_hint, status_bar};

/// Lines scrolled per PgUp/PgDn.
const PAGE: u16 = 10;

/// Application state.
pub(crate) struct App {
    pub nav: Navigator,
    /// Highlighted sidebar row (index into `visible_rows`).
    pub cursor: usize,
    /// Vertical scroll of the content pane.
    pub scroll: u16,
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    pub show_help: bool,
    /// Where the outline came from, for the window title.
    pub source_name: String,
}

impl App {
    pub(crate) fn new(nav: Navigator, source_name: impl Into<String>) -> Self {
        let mut app = Self {
            nav,
            cursor: 0,
            scroll: 0,
            should_quit: false,
            status: "Ready — press ? for help".to_string(),
            show_help: false,
            source_name: source_name.into(),
        };
        app.cursor_to_active();
        app
    }

    fn rows(&self) -> Vec<SidebarRow> {
        self.nav.visible_rows()
    }

    /// Put the cursor on the active entry, if it is visible.
    fn cursor_to_active(&mut self) {
        if let Some(idx) = self.rows().iter().position(|r| r.active) {
            self.cursor = idx;
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn move_cursor(&mut self, down: bool) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        self.cursor = if down {
            (self.cursor + 1).min(len - 1)
        } else {
            self.cursor.saturating_sub(1)
        };
    }

    fn select_at_cursor(&mut self) {
        let Some(row) = self.rows().into_iter().nth(self.cursor) else {
            return;
        };
        if row.kind == RowKind::Category {
            return;
        }
        if self.nav.select(&row.key) {
            debug!(key = %row.key, "section selected");
            self.scroll = 0;
            self.status = row.label;
        }
    }

    fn toggle_at_cursor(&mut self) {
        let Some(row) = self.rows().into_iter().nth(self.cursor) else {
            return;
        };
        if !row.expandable {
            return;
        }
        let open = self.nav.toggle_group(&row.key);
        self.status = format!("{} {}", if open { "Expanded" } else { "Collapsed" }, row.label);
        self.clamp_cursor();
    }

    fn step(&mut self, forward: bool) {
        let moved = if forward {
            self.nav.go_next()
        } else {
            self.nav.go_previous()
        };
        if moved {
            self.scroll = 0;
            self.cursor_to_active();
            self.status = self.nav.active_title().unwrap_or_default().to_string();
        } else if matches!(self.nav.outline(), Outline::Legacy(_)) {
            self.status = "No previous/next links in a flat document".to_string();
        } else {
            self.status = if forward { "Last section" } else { "First section" }.to_string();
        }
    }
}

/// Load the outline, run the event loop, and restore the terminal on exit.
pub(crate) fn run(path: &Path) -> Result<()> {
    let source = OutlineSource::load(path)?;
    let nav = Navigator::new(Outline::build(source));
    info!(path = %path.display(), mode = nav.outline().mode(), "viewer opened");
    let mut app = App::new(nav, path.display().to_string());

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

pub(crate) fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // If help is showing, any key dismisses it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(true),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(false),
        KeyCode::Enter => app.select_at_cursor(),
        KeyCode::Char(' ') => app.toggle_at_cursor(),
        KeyCode::Char('n') => app.step(true),
        KeyCode::Char('p') => app.step(false),
        KeyCode::PageDown => app.scroll = app.scroll.saturating_add(PAGE),
        KeyCode::PageUp => app.scroll = app.scroll.saturating_sub(PAGE),
        _ => {}
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Sidebar + content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[0]);

    draw_sidebar(f, app, panes[0]);
    draw_content(f, app, panes[1]);

    let status = format!(
        "{} sections · {} · {}",
        app.nav.section_count(),
        app.nav.outline().mode(),
        app.status
    );
    f.render_widget(status_bar(&status), chunks[1]);

    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .rows()
        .into_iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            let marker = match (row.expandable, row.expanded) {
                (true, true) => "▾ ",
                (true, false) => "▸ ",
                _ => "  ",
            };
            let style = match (row.kind, row.active) {
                (RowKind::Category, _) => Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                (RowKind::Entry, true) => Style::default().fg(Color::Cyan),
                (RowKind::Entry, false) => Style::default(),
            };
            ListItem::new(Line::from(format!("{indent}{marker}{}", row.label))).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", app.source_name)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default().with_selected(Some(app.cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    let title = match (app.nav.active_breadcrumb(), app.nav.active_title()) {
        (Some(crumb), Some(title)) => format!(" {crumb} › {title} "),
        (None, Some(title)) => format!(" {title} "),
        _ => " docview ".to_string(),
    };

    let body = match (app.nav.active_key(), app.nav.active_content()) {
        (None, _) => "No documentation content.",
        (Some(_), None) => "No content for this section.",
        (Some(_), Some(text)) => text,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let content = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    f.render_widget(content, chunks[0]);

    let hint = nav_hint(
        app.nav.previous().map(|l| l.title),
        app.nav.next().map(|l| l.title),
    );
    f.render_widget(Paragraph::new(hint), chunks[1]);
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  j/k ↑/↓      Move in sidebar"),
        Line::from("  Enter        Open section"),
        Line::from("  Space        Expand/collapse group"),
        Line::from("  n / p        Next/previous section"),
        Line::from("  PgDn/PgUp    Scroll content"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help — press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_for(path: &str) -> App {
        let source = OutlineSource::load(Path::new(path)).expect("load fixture");
        App::new(Navigator::new(Outline::build(source)), path)
    }

    fn press(app: &mut App, c: char) {
        handle_key(app, KeyCode::Char(c), KeyModifiers::NONE);
    }

    #[test]
    fn cursor_starts_on_active_entry() {
        let app = app_for("../../fixtures/json/result.fixture.json");
        // Row 0 is the OVERVIEW category.
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn enter_on_category_keeps_selection() {
        let mut app = app_for("../../fixtures/json/result.fixture.json");
        press(&mut app, 'k');
        assert_eq!(app.cursor, 0);
        handle_key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.nav.active_key(), Some("/docs/platform-overview"));
    }

    #[test]
    fn enter_selects_and_resets_scroll() {
        let mut app = app_for("../../fixtures/json/result.fixture.json");
        handle_key(&mut app, KeyCode::PageDown, KeyModifiers::NONE);
        assert_eq!(app.scroll, PAGE);
        press(&mut app, 'j'); // USER_GUIDES category
        press(&mut app, 'j'); // Trips
        handle_key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.nav.active_key(), Some("/docs/trips"));
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn next_moves_cursor_with_selection() {
        let mut app = app_for("../../fixtures/json/result.fixture.json");
        press(&mut app, 'n');
        assert_eq!(app.nav.active_key(), Some("/docs/trips"));
        assert_eq!(app.cursor, 3);
        press(&mut app, 'p');
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn space_collapses_legacy_group() {
        let mut app = app_for("../../fixtures/markdown/legacy.md");
        assert_eq!(app.cursor, 0);
        press(&mut app, ' ');
        assert_eq!(app.rows().len(), 2);
        press(&mut app, ' ');
        assert_eq!(app.rows().len(), 5);
    }

    #[test]
    fn collapsing_clamps_cursor() {
        let mut app = app_for("../../fixtures/markdown/legacy.md");
        for _ in 0..6 {
            press(&mut app, 'j');
        }
        assert_eq!(app.cursor, 4);
        app.nav.toggle_group("Platform Overview");
        app.clamp_cursor();
        assert_eq!(app.rows().len(), 2);
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn legacy_has_no_next() {
        let mut app = app_for("../../fixtures/markdown/legacy.md");
        press(&mut app, 'n');
        assert_eq!(app.nav.active_key(), Some("Platform Overview"));
        assert!(app.status.contains("flat document"));
    }

    #[test]
    fn help_swallows_next_key() {
        let mut app = app_for("../../fixtures/markdown/legacy.md");
        press(&mut app, '?');
        assert!(app.show_help);
        press(&mut app, 'q');
        assert!(!app.show_help);
        assert!(!app.should_quit);
        press(&mut app, 'q');
        assert!(app.should_quit);
    }
}
