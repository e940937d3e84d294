use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

use attendance_core::View;

use super::state::{LoginFocus, Mode, UiState};
use super::styles;

/// Visible width of the username/password fields
const FIELD_WIDTH: usize = 20;

pub fn render(frame: &mut Frame, state: &UiState) {
    match state.app.view() {
        View::LoggedOut => render_login(frame, state),
        View::LoggedIn => render_main(frame, state),
    }

    if matches!(state.mode, Mode::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_main(frame: &mut Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(5),    // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, state, chunks[0]);
    render_user(frame, state, chunks[1]);
    render_status_bar(frame, state, chunks[2]);
}

fn render_title_bar(frame: &mut Frame, state: &UiState, area: Rect) {
    let title = "  Attendance";
    let version = state
        .app
        .session()
        .and_then(|s| s.backend_version.as_deref())
        .map(|v| format!("backend {}", v))
        .unwrap_or_default();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + version.len() + 2),
        )),
        Span::styled(version, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_user(frame: &mut Frame, state: &UiState, area: Rect) {
    let mut lines = vec![];

    if let Some(session) = state.app.session() {
        let name = display_name(&session.user).unwrap_or_else(|| "Signed in".to_string());
        lines.push(Line::from(Span::styled(
            format!(" {}", name),
            styles::highlight_style(),
        )));
        lines.push(Line::from(""));

        let pretty = serde_json::to_string_pretty(&session.user)
            .unwrap_or_else(|_| session.user.to_string());
        lines.extend(
            pretty
                .lines()
                .map(|l| Line::from(Span::raw(format!(" {}", l)))),
        );
    }

    let block = Block::default()
        .title(" User ")
        .borders(Borders::ALL)
        .border_style(styles::border_style());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, state: &UiState, area: Rect) {
    let left_text = match state.app.status() {
        Some(status) => format!(" {} ", status.text),
        None => " Signed in ".to_string(),
    };
    let left_style = state
        .app
        .status()
        .map(|s| styles::status_style(s.tone))
        .unwrap_or_else(styles::muted_style);
    let right_text = " [l]ogout | [q]uit ";

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_login(frame: &mut Frame, state: &UiState) {
    let status = state.app.status();
    let height = if status.is_some() { 12 } else { 10 };
    let area = centered_rect_fixed(46, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let form = &state.form;
    let mut lines = vec![
        Line::from(Span::styled("            A T T E N D A N C E", styles::title_style())),
        Line::from(Span::styled("               please sign in", styles::muted_style())),
        Line::from(""),
    ];

    let username_focused = form.focus == LoginFocus::Username;
    lines.push(field_line(
        "Username",
        &form.username,
        username_focused,
    ));

    let password_focused = form.focus == LoginFocus::Password;
    let password_masked = "*".repeat(form.password.chars().count());
    lines.push(field_line("Password", &password_masked, password_focused));

    // Login button (centered)
    let button_focused = form.focus == LoginFocus::Button;
    let label = if button_focused { " ▶ Login ◀ " } else { "   Login   " };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("                ["),
        Span::styled(label, styles::field_style(button_focused)),
        Span::raw("]"),
    ]));

    if let Some(status) = status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", status.text),
            styles::status_style(status.tone),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style())
        .style(Style::default());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn field_line<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
    let visible = tail_chars(value, FIELD_WIDTH);
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("    "),
        Span::styled(format!("{}: [", label), styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", visible, cursor, width = FIELD_WIDTH),
            styles::field_style(focused),
        ),
        Span::styled("]", styles::muted_style()),
    ])
}

/// Last `n` characters, so the cursor end of a long value stays visible
fn tail_chars(s: &str, n: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(n)).collect()
}

/// Best-effort human name from an arbitrary user record
fn display_name(user: &Value) -> Option<String> {
    ["name", "fullName", "username", "email"]
        .iter()
        .filter_map(|key| user.get(*key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    // Fixed size dialog matching login screen
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style())
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
