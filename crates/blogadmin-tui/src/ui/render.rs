use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use blogadmin_core::utils::format_remaining;

use crate::app::{App, AppState, LoginFocus, View};

use super::styles;
use super::views::{detail, forms, posts};

const LOGO: [&str; 3] = [
    "   ╔╗ ╦  ╔═╗╔═╗  ╔═╗╔╦╗╔╦╗╦╔╗╔",
    "   ╠╩╗║  ║ ║║ ╦  ╠═╣ ║║║║║║║║║",
    "   ╚═╝╩═╝╚═╝╚═╝  ╩ ╩═╩╝╩ ╩╩╝╚╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::EditingPost => forms::render_post_form(frame, app),
        AppState::EditingComment => forms::render_comment_form(frame, app),
        AppState::ConfirmingDelete => forms::render_delete_confirm(frame, app),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Blog Admin";

    let session_text = if app.is_authenticated() {
        let who = app.config.last_email.as_deref().unwrap_or("admin");
        match app.session_expiry {
            Some(expiry) => format!(
                "{} (expires in {})  [L]ogout  [?] Help ",
                who,
                format_remaining(expiry, Utc::now())
            ),
            None => format!("{}  [L]ogout  [?] Help ", who),
        }
    } else {
        "Not signed in  [?] Help ".to_string()
    };

    let padding = (area.width as usize)
        .saturating_sub(title.chars().count() + session_text.chars().count());

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(session_text, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    if !app.is_authenticated() {
        return;
    }
    match app.view {
        View::Posts => posts::render(frame, app, area),
        View::Detail => detail::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.view {
        View::Posts => "[Enter] open | [n]ew | [p]ublish | [r]eload | [q]uit",
        View::Detail => "[e]dit | [d]elete | [p]ublish | [c] edit comment | [x] delete comment | [Esc] back",
    };

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => String::from(" "),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
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

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|l| Line::from(Span::styled(*l, styles::title_style())))
        .collect()
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 27, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = logo_lines();
    help_text.extend([
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("↑/↓ j/k", "Move selection"),
        help_line("PgUp/PgDn", "Move by page"),
        help_line("Enter", "Open post"),
        help_line("Esc", "Back to post list"),
        Line::from(""),
        Line::from(Span::styled(" Posts", styles::highlight_style())),
        help_line("n", "New post"),
        help_line("e", "Edit post"),
        help_line("p", "Publish / unpublish"),
        help_line("d", "Delete post"),
        help_line("r", "Reload"),
        Line::from(""),
        Line::from(Span::styled(" Comments (post view)", styles::highlight_style())),
        help_line("c", "Edit selected comment"),
        help_line("x", "Delete selected comment"),
        Line::from(""),
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
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 14 } else { 12 };
    let area = centered_rect_fixed(46, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));

    let email_focused = app.login_focus == LoginFocus::Email;
    let email_style = if email_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    // Show the tail of long addresses so the cursor stays visible
    let email_tail: String = {
        let skip = app.login_email.chars().count().saturating_sub(20);
        app.login_email.chars().skip(skip).collect()
    };
    let cursor = if email_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("    "),
        Span::styled("Email:    [", styles::muted_style()),
        Span::styled(format!("{:<20}{}", email_tail, cursor), email_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.chars().count().min(20));
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("    "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{:<20}{}", password_masked, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let label = match (app.login_in_progress, button_focused) {
        (true, _) => " Signing in ",
        (false, true) => " ▶ Login ◀ ",
        (false, false) => "   Login   ",
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("            ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

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

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
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
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        let rect = centered_rect_fixed(46, 10, outer);
        assert_eq!(rect, Rect::new(27, 15, 46, 10));
    }

    #[test]
    fn test_centered_rect_clamps_to_small_terminal() {
        let outer = Rect::new(0, 0, 30, 8);
        let rect = centered_rect_fixed(46, 10, outer);
        assert_eq!(rect.width, 30);
        assert_eq!(rect.height, 8);
        assert_eq!((rect.x, rect.y), (0, 0));
    }
}
