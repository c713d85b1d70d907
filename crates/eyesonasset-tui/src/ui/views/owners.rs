use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use eyesonasset_core::models::OwnerSortColumn;

use crate::app::App;
use crate::ui::styles;

/// Render the owner list with a detail pane for the selection
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    render_table(frame, app, chunks[0]);
    render_detail(frame, app, chunks[1]);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let owners = app.sorted_owners();

    let sort_indicator = |col: OwnerSortColumn| if app.owner_sort == col { " ▲" } else { "" };
    let header = Row::new([
        Cell::from(format!("Name{}", sort_indicator(OwnerSortColumn::Name))),
        Cell::from(format!("Email{}", sort_indicator(OwnerSortColumn::Email))),
        Cell::from("Phone"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = owners
        .iter()
        .map(|owner| {
            Row::new(vec![
                Cell::from(owner.name.clone()),
                Cell::from(owner.email.clone()),
                Cell::from(owner.phone.clone()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(40),
        Constraint::Fill(2),
        Constraint::Length(20),
    ];

    let title = if app.loading && !app.owners.is_loaded() {
        " Owners (loading...) ".to_string()
    } else {
        format!(" Owners ({}) - [s]ort ", app.owners.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !owners.is_empty() {
        state.select(Some(app.owner_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.selected_owner() {
        Some(owner) => {
            let asset_count = app
                .assets
                .items()
                .iter()
                .filter(|a| a.owner_id == owner.id)
                .count();
            vec![
                Line::from(Span::styled(owner.name.clone(), styles::title_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Email: ", styles::muted_style()),
                    Span::raw(owner.email.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Phone: ", styles::muted_style()),
                    Span::raw(owner.phone.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Assets: ", styles::muted_style()),
                    Span::raw(if app.assets.is_loaded() {
                        asset_count.to_string()
                    } else {
                        "-".to_string()
                    }),
                ]),
                Line::from(""),
                Line::from(Span::styled(owner.id.to_string(), styles::muted_style())),
            ]
        }
        None => vec![Line::from(Span::styled(
            "No owners yet. Press [n] to add one.",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Details ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
