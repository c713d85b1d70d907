use ratatui::{
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::form::FieldKind;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

const FIELD_WIDTH: usize = 34;

/// Create/edit dialog for the current screen's record type
pub fn render_form_overlay(frame: &mut Frame, app: &App) {
    let Some(form) = app.edit_form.as_ref() else {
        return;
    };

    let kind = if app.screen == Screen::Assets { "asset" } else { "owner" };
    let heading = match form.editing {
        Some(_) => format!("  Edit {}", kind),
        None => format!("  New {}", kind),
    };

    let mut lines = vec![
        Line::from(Span::styled(heading, styles::title_style())),
        Line::from(""),
    ];

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let shown = match field.kind {
            FieldKind::OwnerChoice => {
                let name = app
                    .owners
                    .items()
                    .iter()
                    .find(|o| o.id.to_string() == field.value)
                    .map(|o| o.name.as_str())
                    .unwrap_or("(choose)");
                format!("◀ {} ▶", name)
            }
            FieldKind::Secret => "*".repeat(field.value.chars().count()),
            FieldKind::Text => {
                let cursor = if focused { "▌" } else { "" };
                format!("{}{}", field.value, cursor)
            }
        };
        let shown: String = shown.chars().take(FIELD_WIDTH).collect();
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>9}: ", field.label), styles::muted_style()),
            Span::styled(format!("{:<width$}", shown, width = FIELD_WIDTH), style),
        ]));
        if let Some(message) = form.field_error(field.key) {
            lines.push(Line::from(Span::styled(
                format!("             {}", message),
                styles::error_style(),
            )));
        }
    }

    if let Some(message) = &form.message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", message), styles::error_style())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  [Enter]", styles::help_key_style()),
        Span::styled(" next/save  ", styles::muted_style()),
        Span::styled("[Ctrl+S]", styles::help_key_style()),
        Span::styled(" save  ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    let height = lines.len() as u16 + 2;
    let area = centered_rect_fixed(52, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(50, 7, frame.area());
    frame.render_widget(Clear, area);

    let name = app.pending_delete_name().unwrap_or("this record");
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   Delete {}?", name), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
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
