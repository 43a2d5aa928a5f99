pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::{
    app::{App, LoginField, Screen},
    results::SessionStats,
    session::SessionState,
    users::LeaderboardEntry,
};
use charting::TimingChart;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const PRACTICE_LEGEND: &str =
    "(enter) start/submit / (^n) new / (^d) difficulty / (^t) category / (^l) leaderboard / (esc) quit";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Login => render_login(self, area, buf),
            Screen::Practice => {
                render_practice(self, area, buf);
                if let Some(stats) = self.stats().filter(|_| self.show_results) {
                    render_results(stats, area, buf);
                }
                if let Some(board) = &self.leaderboard {
                    render_leaderboard(board, area, buf);
                }
            }
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

/// Rect of the given percentage size centred in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn render_login(app: &App, area: Rect, buf: &mut Buffer) {
    let form = &app.login;
    let popup = centered_rect(60, 50, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" wordsprint login ");
    let inner = block.inner(popup);
    block.render(popup, buf);

    let field = |label: &str, value: String, focused: bool| {
        let marker = if focused { "> " } else { "  " };
        let style = if focused { bold() } else { Style::default() };
        Line::from(vec![
            Span::styled(format!("{marker}{label}: "), style),
            Span::raw(value),
            Span::styled(if focused { "_" } else { "" }, dim()),
        ])
    };

    let mut lines = vec![
        field(
            "Username",
            form.username.clone(),
            form.focus == LoginField::Username,
        ),
        field(
            "Password",
            "*".repeat(form.password.chars().count()),
            form.focus == LoginField::Password,
        ),
        Line::default(),
    ];
    if let Some(status) = &form.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(
        "(tab) switch field / (enter) log in / (esc) quit",
        italic(),
    )));

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(inner, buf);
}

fn render_practice(app: &App, area: Rect, buf: &mut Buffer) {
    let controller = &app.controller;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(1), // countdown
            Constraint::Min(3),    // passage
            Constraint::Length(3), // input
            Constraint::Length(1), // live metrics
            Constraint::Length(1), // legend
        ])
        .split(area);

    let username = app.user.as_ref().map_or("-", |u| u.username.as_str());
    Paragraph::new(Line::from(vec![
        Span::styled(username.to_string(), bold()),
        Span::raw(format!(
            "  best {} wpm  |  {}  |  {}",
            app.best_wpm(),
            app.request.category,
            app.request.difficulty
        )),
    ]))
    .render(chunks[0], buf);

    if let SessionState::CountingDown { remaining, .. } = controller.state() {
        if remaining > 0 {
            Paragraph::new(Span::styled(
                remaining.to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
        }
    }

    let satisfied = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let spans: Vec<Span> = controller
        .highlight()
        .into_iter()
        .flat_map(|w| {
            let style = if w.satisfied { satisfied } else { dim() };
            [Span::styled(w.word, style), Span::raw(" ")]
        })
        .collect();
    Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    let input_title = match controller.state() {
        SessionState::Idle => " press enter to start ",
        SessionState::CountingDown { .. } => " get ready ",
        SessionState::Active => " type here, enter to submit ",
        SessionState::Finished => " finished ",
    };
    let cursor = if controller.accepts_input() { "_" } else { "" };
    Paragraph::new(Line::from(vec![
        Span::raw(app.input.clone()),
        Span::styled(cursor, dim()),
    ]))
    .block(Block::default().borders(Borders::ALL).title(input_title))
    .render(chunks[3], buf);

    let metrics = controller.metrics();
    Paragraph::new(Span::styled(
        format!(
            "WPM: {}   Accuracy: {}%   Time: {:.1}s",
            metrics.words_per_minute,
            metrics.accuracy_percent,
            controller.elapsed_seconds()
        ),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    Paragraph::new(Span::styled(PRACTICE_LEGEND, italic())).render(chunks[5], buf);
}

fn render_results(stats: &SessionStats, area: Rect, buf: &mut Buffer) {
    let popup = centered_rect(80, 80, area);
    Clear.render(popup, buf);
    let block = Block::default().borders(Borders::ALL).title(" Results ");
    let inner = block.inner(popup);
    block.render(popup, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let summary = vec![
        Line::from(Span::styled(
            format!("WPM: {}   Accuracy: {}%", stats.wpm, stats.accuracy),
            bold(),
        )),
        Line::from(format!("Time: {} seconds", stats.time_seconds)),
        Line::from(format!(
            "Slowest word: '{}' ({:.2}s)",
            stats.slowest_word, stats.slowest_time
        )),
    ];
    Paragraph::new(summary)
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    TimingChart::new(&stats.word_times).render(chunks[1], buf);

    Paragraph::new(Span::styled("(enter) close / (^n) new passage", italic()))
        .render(chunks[2], buf);
}

fn render_leaderboard(board: &[LeaderboardEntry], area: Rect, buf: &mut Buffer) {
    let popup = centered_rect(50, 60, area);
    Clear.render(popup, buf);

    let lines: Vec<Line> = if board.is_empty() {
        vec![Line::from(Span::styled("No scores yet", italic()))]
    } else {
        board
            .iter()
            .map(|entry| {
                Line::from(format!(
                    "{:>2}. {:<16} {:>4} WPM",
                    entry.rank, entry.username, entry.best_wpm
                ))
            })
            .collect()
    };

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Leaderboard (esc to close) "),
        )
        .render(popup, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::config::Config;
    use crate::passages::FixedTextSource;
    use crate::users::MemoryUserStore;

    fn create_test_app(prompt: &str) -> App {
        App::new(
            Box::new(FixedTextSource(prompt.to_string())),
            Box::new(MemoryUserStore::new()),
            Config::default(),
        )
    }

    fn render(app: &App, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn finish_session(app: &mut App, typed: &str) {
        let clock = ManualClock::new();
        app.start(clock.now());
        clock.advance_ms(3300);
        app.on_tick(clock.now());
        app.set_input(typed, clock.now());
        clock.advance_ms(1000);
        app.submit(clock.now());
    }

    #[test]
    fn test_login_screen() {
        let mut app = create_test_app("hello world");
        app.login("", "");
        let rendered = render(&app, Rect::new(0, 0, 80, 24));
        assert!(rendered.contains("Username"));
        assert!(rendered.contains("Password"));
        assert!(rendered.contains("Enter both"));
    }

    #[test]
    fn test_password_is_masked() {
        let mut app = create_test_app("hello world");
        app.login.password = "secret".into();
        let rendered = render(&app, Rect::new(0, 0, 80, 24));
        assert!(rendered.contains("******"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_practice_screen_shows_passage() {
        let mut app = create_test_app("hello world");
        app.login("ada", "pw");
        let rendered = render(&app, Rect::new(0, 0, 80, 24));
        assert!(rendered.contains("hello"));
        assert!(rendered.contains("world"));
        assert!(rendered.contains("ada"));
        assert!(rendered.contains("press enter to start"));
    }

    #[test]
    fn test_countdown_digit() {
        let mut app = create_test_app("hello world");
        app.login("ada", "pw");
        app.start(ManualClock::new().now());
        let rendered = render(&app, Rect::new(0, 0, 80, 24));
        assert!(rendered.contains("get ready"));
        assert!(rendered.contains('3'));
    }

    #[test]
    fn test_results_overlay() {
        let mut app = create_test_app("hello world");
        app.login("ada", "pw");
        finish_session(&mut app, "hello world");

        let rendered = render(&app, Rect::new(0, 0, 100, 40));
        assert!(rendered.contains("Results"));
        assert!(rendered.contains("Accuracy: 100%"));
        assert!(rendered.contains("Slowest word"));
    }

    #[test]
    fn test_leaderboard_overlay() {
        let mut app = create_test_app("hello");
        app.login("ada", "pw");
        app.toggle_leaderboard();
        let rendered = render(&app, Rect::new(0, 0, 80, 24));
        assert!(rendered.contains("Leaderboard"));
        assert!(rendered.contains(" 1. ada"));
    }

    #[test]
    fn test_extreme_sizes() {
        let mut app = create_test_app("test prompt");
        app.login("ada", "pw");
        finish_session(&mut app, "test");

        for area in [
            Rect::new(0, 0, 10, 5),
            Rect::new(0, 0, 200, 5),
            Rect::new(0, 0, 20, 50),
            Rect::new(0, 0, 300, 120),
        ] {
            let mut buffer = Buffer::empty(area);
            (&app).render(area, &mut buffer);
            assert!(*buffer.area() == area);
        }
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(50, 50, area);
        assert!(popup.x >= 25 && popup.right() <= 75);
        assert!(popup.y >= 12 && popup.bottom() <= 38);
    }

    #[test]
    fn test_ui_constants() {
        const _: () = assert!(HORIZONTAL_MARGIN * 2 < 80);
        const _: () = assert!(VERTICAL_MARGIN * 2 < 24);
    }
}
