use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use blogadmin_core::utils::{first_line, truncate_string};

use crate::app::App;
use crate::ui::styles;

/// Width of the author column in the comment list
const AUTHOR_WIDTH: usize = 16;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.detail.is_none() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "Loading post...",
            styles::muted_style(),
        )))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_post(frame, app, chunks[0]);
    render_comments(frame, app, chunks[1]);
}

fn render_post(frame: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = app.detail.as_ref() else {
        return;
    };
    let post = &detail.post;

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Status:  ", styles::muted_style()),
            Span::styled(
                post.status().to_string(),
                styles::publish_status_style(post.is_published),
            ),
        ]),
        Line::from(vec![
            Span::styled("Created: ", styles::muted_style()),
            Span::raw(post.created_display()),
        ]),
        Line::from(""),
    ];
    lines.extend(post.content.lines().map(|l| Line::from(l.to_string())));

    let block = Block::default()
        .title(format!(" {} ", truncate_string(&post.title, 70)))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_comments(frame: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = app.detail.as_ref() else {
        return;
    };

    let block = Block::default()
        .title(format!(" Comments ({}) ", detail.comments.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if detail.comments.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "No comments on this post",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = detail
        .comments
        .iter()
        .enumerate()
        .map(|(i, comment)| {
            let author = detail.authors.username(comment.user_id);
            let author = if author.is_empty() {
                format!("user {}", comment.user_id)
            } else {
                author.to_string()
            };

            let style = if i == app.comment_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("{:<width$} ", truncate_string(&author, AUTHOR_WIDTH), width = AUTHOR_WIDTH),
                    styles::highlight_style(),
                ),
                Span::styled(format!("{:<19} ", comment.created_display()), styles::muted_style()),
                Span::raw(first_line(&comment.content).to_string()),
            ]);

            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.comment_selection));

    frame.render_stateful_widget(list, area, &mut state);
}
