//! Overlay forms: post create/edit, comment edit and delete confirmation.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use blogadmin_core::utils::truncate_string;

use crate::app::{App, DeleteTarget, PostFormFocus};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

const CURSOR: &str = "▌";

fn field_style(focused: bool) -> ratatui::style::Style {
    if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    }
}

fn save_button(focused: bool, saving: bool) -> Line<'static> {
    let label = match (saving, focused) {
        (true, _) => " Saving... ",
        (false, true) => " ▶ Save ◀ ",
        (false, false) => "   Save   ",
    };
    Line::from(vec![
        Span::raw("  ["),
        Span::styled(label, field_style(focused)),
        Span::raw("]"),
    ])
}

pub fn render_post_form(frame: &mut Frame, app: &App) {
    let Some(form) = app.post_form.as_ref() else {
        return;
    };

    let area = centered_rect_fixed(72, 22, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(form.heading())
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(5),    // Content
            Constraint::Length(1), // Button
            Constraint::Length(1), // Error / hint
        ])
        .split(inner);

    let title_focused = form.focus == PostFormFocus::Title;
    let title_cursor = if title_focused { CURSOR } else { "" };
    let title = Paragraph::new(Line::from(Span::styled(
        format!("{}{}", form.title, title_cursor),
        field_style(title_focused),
    )))
    .block(
        Block::default()
            .title(" Title ")
            .borders(Borders::ALL)
            .border_style(styles::border_style(title_focused)),
    );
    frame.render_widget(title, chunks[0]);

    let content_focused = form.focus == PostFormFocus::Content;
    let content_cursor = if content_focused { CURSOR } else { "" };
    let content = Paragraph::new(format!("{}{}", form.content, content_cursor))
        .style(styles::list_item_style())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" Content ")
                .borders(Borders::ALL)
                .border_style(styles::border_style(content_focused)),
        );
    frame.render_widget(content, chunks[1]);

    frame.render_widget(
        Paragraph::new(save_button(form.focus == PostFormFocus::Button, form.saving)),
        chunks[2],
    );

    let footer = match form.error {
        Some(ref error) => Line::from(Span::styled(format!(" {}", error), styles::error_style())),
        None => Line::from(Span::styled(
            " Tab: next field | Enter: newline in content, save on button | Esc: cancel",
            styles::muted_style(),
        )),
    };
    frame.render_widget(Paragraph::new(footer), chunks[3]);
}

pub fn render_comment_form(frame: &mut Frame, app: &App) {
    let Some(form) = app.comment_form.as_ref() else {
        return;
    };

    let area = centered_rect_fixed(64, 12, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Edit Comment ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let content = Paragraph::new(format!("{}{}", form.content, CURSOR))
        .style(styles::selected_style())
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(true)));
    frame.render_widget(content, chunks[0]);

    frame.render_widget(Paragraph::new(save_button(true, form.saving)), chunks[1]);

    let footer = match form.error {
        Some(ref error) => Line::from(Span::styled(format!(" {}", error), styles::error_style())),
        None => Line::from(Span::styled(" Enter: save | Esc: cancel", styles::muted_style())),
    };
    frame.render_widget(Paragraph::new(footer), chunks[2]);
}

pub fn render_delete_confirm(frame: &mut Frame, app: &App) {
    let Some(target) = app.pending_delete.as_ref() else {
        return;
    };

    let area = centered_rect_fixed(50, 8, frame.area());
    frame.render_widget(Clear, area);

    let question = match target {
        DeleteTarget::Post { title, .. } => {
            format!("Delete post \"{}\"?", truncate_string(title, 28))
        }
        DeleteTarget::Comment { .. } => "Delete this comment?".to_string(),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   {}", question), styles::highlight_style())),
        Line::from(Span::styled("   This cannot be undone.", styles::muted_style())),
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
        .title(" Confirm Delete ")
        .title_style(styles::error_style())
        .borders(Borders::ALL)
        .border_style(styles::error_style());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
