use ratatui::{
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::form::{FieldKind, Form};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

/// Visible width of a login field
const FIELD_WIDTH: usize = 20;

/// Render the login or register dialog
pub fn render(frame: &mut Frame, app: &App) {
    let form = &app.login_form;
    let feedback = feedback_lines(form);
    let height = 9 + feedback.len() as u16;
    let area = centered_rect_fixed(50, height, frame.area());
    frame.render_widget(Clear, area);

    let (heading, button) = match app.screen {
        Screen::Register => ("Create an account", "Register"),
        _ => ("Sign in", "Login"),
    };

    let mut lines = vec![
        Line::from(Span::styled(format!("  {}", heading), styles::title_style())),
        Line::from(""),
    ];

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let shown: String = match field.kind {
            FieldKind::Secret => "*".repeat(field.value.chars().count().min(FIELD_WIDTH)),
            _ => tail(&field.value, FIELD_WIDTH),
        };
        let cursor = if focused { "▌" } else { "" };
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>9}: [", field.label), styles::muted_style()),
            Span::styled(format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH), style),
            Span::styled("]", styles::muted_style()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("               ["),
        Span::styled(format!("  {}  ", button), styles::highlight_style()),
        Span::raw("]"),
    ]));
    lines.extend(feedback);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn feedback_lines(form: &Form) -> Vec<Line<'static>> {
    let mut lines = vec![];
    if let Some(errors) = &form.errors {
        lines.push(Line::from(""));
        for e in errors.fields() {
            lines.push(Line::from(Span::styled(format!("  {}", e.message), styles::error_style())));
        }
    }
    if let Some(message) = &form.message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", message), styles::error_style())));
    }
    lines
}

/// Last `width` characters, so the cursor end stays visible
fn tail(value: &str, width: usize) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(width)).collect()
}
