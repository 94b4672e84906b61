//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Network work is only ever started here,
//! never awaited.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_comment_char, can_add_content_char, can_add_email_char, can_add_password_char,
    can_add_title_char, App, AppState, LoginFocus, PostFormFocus, View, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key),
        AppState::EditingPost => {
            handle_post_form_input(app, key);
            return false;
        }
        AppState::EditingComment => {
            handle_comment_form_input(app, key);
            return false;
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            return false;
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return false;
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return true;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return false;
        }
        AppState::Quitting => return true,
        AppState::Normal => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return false;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return false;
        }
        KeyCode::Char('L') => {
            app.logout();
            return false;
        }
        KeyCode::Char('p') => {
            app.toggle_publish();
            return false;
        }
        KeyCode::Char('n') => {
            app.start_new_post();
            return false;
        }
        _ => {}
    }

    match app.view {
        View::Posts => handle_posts_input(app, key),
        View::Detail => handle_detail_input(app, key),
    }
    false
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            // Nothing to go back to without a session
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.attempt_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    false
}

fn handle_posts_input(app: &mut App, key: KeyEvent) {
    let max = app.posts.len().saturating_sub(1);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.post_selection = (app.post_selection + 1).min(max);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.post_selection = app.post_selection.saturating_sub(1);
        }
        KeyCode::PageDown => {
            app.post_selection = (app.post_selection + PAGE_SCROLL_SIZE).min(max);
        }
        KeyCode::PageUp => {
            app.post_selection = app.post_selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::Home => app.post_selection = 0,
        KeyCode::End => app.post_selection = max,
        KeyCode::Enter => app.open_selected_post(),
        KeyCode::Char('r') => app.reload_posts(),
        KeyCode::Char('e') => app.start_edit_post(),
        KeyCode::Char('d') => app.request_delete_post(),
        _ => {}
    }
}

fn handle_detail_input(app: &mut App, key: KeyEvent) {
    let max = app.comment_count().saturating_sub(1);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.comment_selection = (app.comment_selection + 1).min(max);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.comment_selection = app.comment_selection.saturating_sub(1);
        }
        KeyCode::PageDown => {
            app.comment_selection = (app.comment_selection + PAGE_SCROLL_SIZE).min(max);
        }
        KeyCode::PageUp => {
            app.comment_selection = app.comment_selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::Esc | KeyCode::Backspace => app.close_detail(),
        KeyCode::Char('e') => app.start_edit_post(),
        KeyCode::Char('d') => app.request_delete_post(),
        KeyCode::Char('c') => app.start_edit_comment(),
        KeyCode::Char('x') => app.request_delete_comment(),
        KeyCode::Char('r') => {
            if let Some(id) = app.detail.as_ref().map(|d| d.post.id) {
                app.open_detail(id);
            }
        }
        _ => {}
    }
}

fn handle_post_form_input(app: &mut App, key: KeyEvent) {
    let on_button = app
        .post_form
        .as_ref()
        .is_some_and(|f| f.focus == PostFormFocus::Button);
    match key.code {
        KeyCode::Esc => return app.cancel_post_form(),
        KeyCode::Enter if on_button => return app.save_post_form(),
        _ => {}
    }

    let Some(form) = app.post_form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };

    match key.code {
        KeyCode::Tab => form.focus = form.focus.next(),
        KeyCode::BackTab => form.focus = form.focus.prev(),
        KeyCode::Enter => match form.focus {
            PostFormFocus::Title => form.focus = PostFormFocus::Content,
            PostFormFocus::Content => {
                if can_add_content_char(form.content.chars().count(), '\n') {
                    form.content.push('\n');
                }
            }
            PostFormFocus::Button => {}
        },
        KeyCode::Backspace => match form.focus {
            PostFormFocus::Title => {
                form.title.pop();
            }
            PostFormFocus::Content => {
                form.content.pop();
            }
            PostFormFocus::Button => {}
        },
        KeyCode::Char(c) => match form.focus {
            PostFormFocus::Title => {
                if can_add_title_char(form.title.chars().count(), c) {
                    form.title.push(c);
                }
            }
            PostFormFocus::Content => {
                if can_add_content_char(form.content.chars().count(), c) {
                    form.content.push(c);
                }
            }
            PostFormFocus::Button => {}
        },
        _ => {}
    }
}

fn handle_comment_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => return app.cancel_comment_form(),
        KeyCode::Enter => return app.save_comment_form(),
        _ => {}
    }

    let Some(form) = app.comment_form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };

    match key.code {
        KeyCode::Backspace => {
            form.content.pop();
        }
        KeyCode::Char(c) => {
            if can_add_comment_char(form.content.chars().count(), c) {
                form.content.push(c);
            }
        }
        _ => {}
    }
}
