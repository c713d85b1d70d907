use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, Screen};

use super::styles;
use super::views::{assets, auth, edit, owners};

const APP_TITLE: &str = "  EyesOnAsset";

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[3]);

    if app.screen.is_public() {
        auth::render(frame, app);
    } else {
        render_tabs(frame, app, chunks[1]);
        match app.screen {
            Screen::Assets => assets::render(frame, app, chunks[2]),
            _ => owners::render(frame, app, chunks[2]),
        }
    }

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::Editing => edit::render_form_overlay(frame, app),
        AppState::ConfirmingDelete => edit::render_delete_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(APP_TITLE, styles::title_style()),
        Span::styled(format!("  {}", app.screen.title()), styles::muted_style()),
    ];
    let mut right = vec![];

    if !app.screen.is_public() {
        if let Some(minutes) = app.session_minutes_left() {
            right.push(Span::styled(
                format!("Session: {}m left", minutes),
                styles::session_style(minutes),
            ));
            right.push(Span::raw("  "));
        }
        right.push(Span::styled("[?] Help", styles::muted_style()));
    }

    let used: usize = spans.iter().chain(right.iter()).map(|s| s.content.chars().count()).sum();
    spans.push(Span::raw(" ".repeat((area.width as usize).saturating_sub(used + 2))));
    spans.extend(right);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [
        ("[1] Owners", app.screen == Screen::Owners),
        ("[2] Assets", app.screen == Screen::Assets),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(*label, styles::tab_style(*selected)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.screen {
        Screen::Login => "[Enter] login | [Ctrl+R] register | [Esc] quit",
        Screen::Register => "[Enter] create account | [Esc] back",
        Screen::Owners | Screen::Assets => "[n]ew | [e]dit | [d]elete | [L]ogout | [q]uit",
    };

    let left_text = match (&app.status_message, app.screen) {
        (Some(msg), _) => format!(" {} ", msg),
        (None, Screen::Owners) => format!(" Updated {} ", app.owners.age_display(chrono::Utc::now())),
        (None, Screen::Assets) => format!(" Updated {} ", app.assets.age_display(chrono::Utc::now())),
        (None, _) => String::new(),
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 22, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(" EyesOnAsset", styles::title_style())),
        Line::from(Span::styled(format!(" version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1/2", "Owners / Assets"),
        help_line("←/→ Tab", "Switch screen"),
        help_line("↑/↓ j/k", "Move selection"),
        help_line("PgUp/PgDn", "Scroll a page"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("n", "New record"),
        help_line("e Enter", "Edit selected"),
        help_line("d", "Delete selected"),
        help_line("s", "Toggle sort column"),
        help_line("u", "Reload from server"),
        help_line("L", "Log out"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
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
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_small_terminal() {
        let area = Rect::new(0, 0, 30, 10);
        let rect = centered_rect_fixed(46, 14, area);
        assert_eq!(rect, Rect::new(0, 0, 30, 10));

        let rect = centered_rect_fixed(20, 4, Rect::new(0, 0, 40, 20));
        assert_eq!(rect, Rect::new(10, 8, 20, 4));
    }
}
