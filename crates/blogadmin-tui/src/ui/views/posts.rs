use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use blogadmin_core::utils::truncate_string;

use crate::app::App;
use crate::ui::styles;

/// Title column width in characters
const TITLE_WIDTH: usize = 60;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Posts ({}) ", app.posts.len());
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if app.posts.is_empty() {
        let message = if app.loading {
            "Loading posts..."
        } else {
            "No posts yet. Press [n] to write one."
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(message, styles::muted_style())))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new([
        Cell::from("ID"),
        Cell::from("Title"),
        Cell::from("Status"),
        Cell::from("Created"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .posts
        .iter()
        .enumerate()
        .map(|(i, post)| {
            let style = if i == app.post_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(post.id.to_string()),
                Cell::from(truncate_string(&post.title, TITLE_WIDTH)),
                Cell::from(Span::styled(
                    post.status().to_string(),
                    styles::publish_status_style(post.is_published),
                )),
                Cell::from(post.created_display()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(12),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths).header(header).block(block);

    let mut state = TableState::default();
    state.select(Some(app.post_selection));

    frame.render_stateful_widget(table, area, &mut state);
}
