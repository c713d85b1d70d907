use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use eyesonasset_core::models::AssetSortColumn;

use crate::app::App;
use crate::ui::styles;

/// Render the asset list; the owner column is resolved from the owner list
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let assets = app.sorted_assets();

    let sort_indicator = |col: AssetSortColumn| if app.asset_sort == col { " ▲" } else { "" };
    let header = Row::new([
        Cell::from(format!("Name{}", sort_indicator(AssetSortColumn::Name))),
        Cell::from(format!("Category{}", sort_indicator(AssetSortColumn::Category))),
        Cell::from("Owner"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = assets
        .iter()
        .map(|asset| {
            Row::new(vec![
                Cell::from(asset.name.clone()),
                Cell::from(asset.category.clone()),
                Cell::from(app.asset_owner_name(asset).to_string()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(40),
        Constraint::Percentage(25),
        Constraint::Fill(1),
    ];

    let title = if app.loading && !app.assets.is_loaded() {
        " Assets (loading...) ".to_string()
    } else if assets.is_empty() {
        " Assets (0) - press [n] to add one ".to_string()
    } else {
        format!(" Assets ({}) - [s]ort ", app.assets.len())
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
    if !assets.is_empty() {
        state.select(Some(app.asset_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
