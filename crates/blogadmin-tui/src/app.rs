//! Application state management for the blog admin TUI.
//!
//! This module contains the core `App` struct that manages all application state,
//! including UI state, loaded posts and comments, the session watch, and
//! background task coordination.

use std::future::Future;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use blogadmin_core::api::{AdminClient, ApiError, PostDetail};
use blogadmin_core::auth::SessionState;
use blogadmin_core::config::Config;
use blogadmin_core::models::{Comment, Post, PostDraft};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for email input.
const MAX_EMAIL_LENGTH: usize = 100;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

const MAX_TITLE_LENGTH: usize = 200;

const MAX_CONTENT_LENGTH: usize = 20_000;

const MAX_COMMENT_LENGTH: usize = 2_000;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Which screen is shown under any overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Posts,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    EditingPost,
    EditingComment,
    ConfirmingDelete,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// Post form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFormFocus {
    Title,
    Content,
    Button,
}

impl PostFormFocus {
    pub fn next(&self) -> Self {
        match self {
            PostFormFocus::Title => PostFormFocus::Content,
            PostFormFocus::Content => PostFormFocus::Button,
            PostFormFocus::Button => PostFormFocus::Title,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            PostFormFocus::Title => PostFormFocus::Button,
            PostFormFocus::Content => PostFormFocus::Title,
            PostFormFocus::Button => PostFormFocus::Content,
        }
    }
}

/// What a pending delete confirmation refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Post { id: i64, title: String },
    Comment { id: i64, post_id: i64 },
}

/// Create/edit post form
#[derive(Debug, Clone)]
pub struct PostForm {
    /// `None` when creating a new post
    pub post_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub focus: PostFormFocus,
    pub error: Option<String>,
    pub saving: bool,
}

impl PostForm {
    fn new_post() -> Self {
        Self {
            post_id: None,
            title: String::new(),
            content: String::new(),
            focus: PostFormFocus::Title,
            error: None,
            saving: false,
        }
    }

    fn edit(post: &Post) -> Self {
        Self {
            post_id: Some(post.id),
            title: post.title.clone(),
            content: post.content.clone(),
            ..Self::new_post()
        }
    }

    pub fn heading(&self) -> &'static str {
        if self.post_id.is_some() {
            " Edit Post "
        } else {
            " New Post "
        }
    }

    fn draft(&self) -> PostDraft {
        PostDraft::new(self.title.trim(), self.content.clone())
    }
}

/// Edit comment form
#[derive(Debug, Clone)]
pub struct CommentForm {
    pub comment_id: i64,
    pub post_id: i64,
    pub content: String,
    pub error: Option<String>,
    pub saving: bool,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned network tasks.
enum TaskResult {
    LoggedIn { email: String },
    LoginFailed(String),
    Posts(Vec<Post>),
    Detail(PostDetail),
    PublishToggled(Post),
    PostSaved { post_id: Option<i64> },
    PostDeleted(i64),
    CommentSaved { post_id: i64 },
    CommentDeleted { post_id: i64 },
    /// A failed action; the message is ready for display
    Failed(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub client: AdminClient,
    session_rx: watch::Receiver<SessionState>,

    // UI State
    pub state: AppState,
    pub view: View,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    pub login_in_progress: bool,

    // Data
    pub posts: Vec<Post>,
    pub detail: Option<PostDetail>,
    /// Post whose detail is being loaded; other detail results are stale
    pending_detail: Option<i64>,

    // Selection indices
    pub post_selection: usize,
    pub comment_selection: usize,

    // Forms and confirmations
    pub post_form: Option<PostForm>,
    pub comment_form: Option<CommentForm>,
    pub pending_delete: Option<DeleteTarget>,

    pub loading: bool,
    pub status_message: Option<String>,
    /// Expiry of the current credential, refreshed on session changes
    pub session_expiry: Option<DateTime<Utc>>,

    // Background task channel
    task_tx: mpsc::Sender<TaskResult>,
    task_rx: mpsc::Receiver<TaskResult>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, client: AdminClient) -> Self {
        let session_rx = client.session().subscribe();
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_email = config.login_email().unwrap_or_default().to_string();
        let login_password = config.login_password().unwrap_or_default().to_string();

        Self {
            config,
            client,
            session_rx,

            state: AppState::Normal,
            view: View::Posts,

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,
            login_in_progress: false,

            posts: Vec::new(),
            detail: None,
            pending_detail: None,

            post_selection: 0,
            comment_selection: 0,

            post_form: None,
            comment_form: None,
            pending_delete: None,

            loading: false,
            status_message: None,
            session_expiry: None,

            task_tx,
            task_rx,
        }
    }

    /// Show the login screen or load posts, depending on the session.
    pub fn start(&mut self) {
        self.refresh_session_expiry();
        if self.is_authenticated() {
            self.reload_posts();
        } else {
            self.start_login();
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated()
    }

    /// Show the login form
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_in_progress = false;
    }

    /// Submit the login form in the background
    pub fn attempt_login(&mut self) {
        if self.login_in_progress {
            return;
        }

        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return;
        }

        self.login_error = None;
        self.login_in_progress = true;

        let client = self.client.clone();
        self.spawn_task(async move {
            match client.authenticate(&email, &password).await {
                Ok(()) => TaskResult::LoggedIn { email },
                Err(e) => {
                    error!(error = %e, "Login failed");
                    TaskResult::LoginFailed(login_message(&e))
                }
            }
        });
    }

    pub fn logout(&mut self) {
        self.client.logout();
        self.check_session();
        self.login_error = None;
        self.status_message = Some("Logged out".to_string());
    }

    /// React to session changes made anywhere (logout, expiry, 401, revocation).
    pub fn check_session(&mut self) {
        if !self.session_rx.has_changed().unwrap_or(false) {
            return;
        }
        let state = *self.session_rx.borrow_and_update();
        debug!(?state, "Session state changed");
        self.refresh_session_expiry();

        if state == SessionState::Unauthenticated {
            let was_active = self.state != AppState::LoggingIn;
            self.clear_data();
            self.start_login();
            if was_active {
                self.login_error = Some("Session ended - please log in again".to_string());
            }
        }
    }

    fn refresh_session_expiry(&mut self) {
        self.session_expiry = if self.is_authenticated() {
            self.client.session().expires_at()
        } else {
            None
        };
    }

    fn clear_data(&mut self) {
        self.posts.clear();
        self.detail = None;
        self.pending_detail = None;
        self.view = View::Posts;
        self.post_selection = 0;
        self.comment_selection = 0;
        self.post_form = None;
        self.comment_form = None;
        self.pending_delete = None;
        self.loading = false;
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = task.await;
            if let Err(e) = tx.send(result).await {
                error!(error = %e, "Failed to send task result - channel closed");
            }
        });
    }

    /// Drain finished background tasks and apply their results.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_task_result(result);
        }

        self.check_session();
    }

    fn process_task_result(&mut self, result: TaskResult) {
        let login_result = matches!(result, TaskResult::LoggedIn { .. } | TaskResult::LoginFailed(_));
        if !login_result && !self.is_authenticated() {
            debug!("Dropping task result received after the session ended");
            return;
        }

        match result {
            TaskResult::LoggedIn { email } => {
                info!("Login successful");
                self.login_in_progress = false;
                self.login_password.clear();
                self.login_error = None;
                self.state = AppState::Normal;

                if self.config.last_email.as_deref() != Some(email.as_str()) {
                    self.config.last_email = Some(email);
                    if let Err(e) = self.config.save() {
                        warn!(error = %e, "Failed to save config");
                    }
                }
                self.reload_posts();
            }
            TaskResult::LoginFailed(message) => {
                self.login_in_progress = false;
                self.login_error = Some(message);
            }
            TaskResult::Posts(posts) => {
                self.loading = false;
                self.status_message = Some(format!("Loaded {} posts", posts.len()));
                self.posts = posts;
                self.post_selection = self.post_selection.min(self.posts.len().saturating_sub(1));
            }
            TaskResult::Detail(detail) => {
                if self.pending_detail != Some(detail.post.id) {
                    debug!(post_id = detail.post.id, "Dropping stale post detail");
                    return;
                }
                self.pending_detail = None;
                self.loading = false;
                self.status_message = None;
                self.comment_selection = self
                    .comment_selection
                    .min(detail.comments.len().saturating_sub(1));
                self.detail = Some(detail);
                self.view = View::Detail;
            }
            TaskResult::PublishToggled(post) => {
                self.status_message = Some(format!("Post {}", post.status().to_string().to_lowercase()));
                if let Some(existing) = self.posts.iter_mut().find(|p| p.id == post.id) {
                    *existing = post.clone();
                }
                if let Some(detail) = self.detail.as_mut().filter(|d| d.post.id == post.id) {
                    detail.post = post;
                }
            }
            TaskResult::PostSaved { post_id } => {
                self.post_form = None;
                self.state = AppState::Normal;
                self.status_message = Some(
                    if post_id.is_some() { "Post updated" } else { "Post created" }.to_string(),
                );
                self.reload_posts();
                if let Some(id) = post_id.filter(|_| self.view == View::Detail) {
                    self.open_detail(id);
                }
            }
            TaskResult::PostDeleted(id) => {
                self.status_message = Some("Post deleted".to_string());
                self.posts.retain(|p| p.id != id);
                self.post_selection = self.post_selection.min(self.posts.len().saturating_sub(1));
                if self.detail.as_ref().is_some_and(|d| d.post.id == id) {
                    self.detail = None;
                    self.view = View::Posts;
                }
            }
            TaskResult::CommentSaved { post_id } => {
                self.comment_form = None;
                self.state = AppState::Normal;
                self.status_message = Some("Comment updated".to_string());
                self.refresh_detail(post_id);
            }
            TaskResult::CommentDeleted { post_id } => {
                self.status_message = Some("Comment deleted".to_string());
                self.refresh_detail(post_id);
            }
            TaskResult::Failed(message) => {
                self.loading = false;
                if let Some(form) = self.post_form.as_mut() {
                    form.saving = false;
                    form.error = Some(message);
                } else if let Some(form) = self.comment_form.as_mut() {
                    form.saving = false;
                    form.error = Some(message);
                } else {
                    self.status_message = Some(message);
                }
            }
        }
    }

    // =========================================================================
    // Posts
    // =========================================================================

    pub fn reload_posts(&mut self) {
        self.loading = true;
        self.status_message = Some("Loading posts...".to_string());

        let client = self.client.clone();
        self.spawn_task(async move {
            match client.list_posts().await {
                Ok(posts) => TaskResult::Posts(posts),
                Err(e) => failed(&e, "Posts"),
            }
        });
    }

    pub fn selected_post(&self) -> Option<&Post> {
        match self.view {
            View::Posts => self.posts.get(self.post_selection),
            View::Detail => self.detail.as_ref().map(|d| &d.post),
        }
    }

    pub fn open_detail(&mut self, post_id: i64) {
        self.loading = true;
        self.pending_detail = Some(post_id);

        let client = self.client.clone();
        self.spawn_task(async move {
            match client.load_post_detail(post_id).await {
                Ok(detail) => TaskResult::Detail(detail),
                Err(e) => failed(&e, "Post"),
            }
        });
    }

    pub fn open_selected_post(&mut self) {
        if let Some(id) = self.posts.get(self.post_selection).map(|p| p.id) {
            self.comment_selection = 0;
            self.open_detail(id);
        }
    }

    pub fn close_detail(&mut self) {
        self.view = View::Posts;
        self.detail = None;
        self.pending_detail = None;
        self.loading = false;
        self.comment_selection = 0;
    }

    /// Reload the detail only if it is still on screen.
    fn refresh_detail(&mut self, post_id: i64) {
        if self.view == View::Detail && self.detail.as_ref().is_some_and(|d| d.post.id == post_id) {
            self.open_detail(post_id);
        }
    }

    /// Flip the publish flag of the selected post; the display changes once
    /// the backend accepts it.
    pub fn toggle_publish(&mut self) {
        let Some(post) = self.selected_post().cloned() else {
            return;
        };
        let published = !post.is_published;
        self.status_message = Some(format!("{}ing...", post.toggle_label()));

        let client = self.client.clone();
        self.spawn_task(async move {
            match client.set_published(&post, published).await {
                Ok(updated) => TaskResult::PublishToggled(updated),
                Err(e) => failed(&e, "Post"),
            }
        });
    }

    pub fn start_new_post(&mut self) {
        self.post_form = Some(PostForm::new_post());
        self.state = AppState::EditingPost;
    }

    pub fn start_edit_post(&mut self) {
        if let Some(form) = self.selected_post().map(PostForm::edit) {
            self.post_form = Some(form);
            self.state = AppState::EditingPost;
        }
    }

    pub fn cancel_post_form(&mut self) {
        self.post_form = None;
        self.state = AppState::Normal;
    }

    pub fn save_post_form(&mut self) {
        let Some(form) = self.post_form.as_mut() else {
            return;
        };
        if form.saving {
            return;
        }

        let draft = form.draft();
        if let Err(message) = draft.validate() {
            form.error = Some(message.to_string());
            return;
        }
        form.error = None;
        form.saving = true;

        let post_id = form.post_id;
        let client = self.client.clone();
        self.spawn_task(async move {
            let result = match post_id {
                Some(id) => client.update_post(id, &draft).await,
                None => client.create_post(&draft).await,
            };
            match result {
                Ok(()) => TaskResult::PostSaved { post_id },
                Err(e) => failed(&e, "Post"),
            }
        });
    }

    pub fn request_delete_post(&mut self) {
        let target = self.selected_post().map(|post| DeleteTarget::Post {
            id: post.id,
            title: post.title.clone(),
        });
        if target.is_some() {
            self.pending_delete = target;
            self.state = AppState::ConfirmingDelete;
        }
    }

    // =========================================================================
    // Comments
    // =========================================================================

    pub fn selected_comment(&self) -> Option<&Comment> {
        self.detail
            .as_ref()
            .and_then(|d| d.comments.get(self.comment_selection))
    }

    pub fn comment_count(&self) -> usize {
        self.detail.as_ref().map(|d| d.comments.len()).unwrap_or(0)
    }

    pub fn start_edit_comment(&mut self) {
        let form = self.selected_comment().map(|comment| CommentForm {
            comment_id: comment.id,
            post_id: comment.post_id,
            content: comment.content.clone(),
            error: None,
            saving: false,
        });
        if form.is_some() {
            self.comment_form = form;
            self.state = AppState::EditingComment;
        }
    }

    pub fn cancel_comment_form(&mut self) {
        self.comment_form = None;
        self.state = AppState::Normal;
    }

    pub fn save_comment_form(&mut self) {
        let Some(form) = self.comment_form.as_mut() else {
            return;
        };
        if form.saving {
            return;
        }

        let content = form.content.trim().to_string();
        if content.is_empty() {
            form.error = Some("Comment cannot be empty".to_string());
            return;
        }
        form.error = None;
        form.saving = true;

        let (comment_id, post_id) = (form.comment_id, form.post_id);
        let client = self.client.clone();
        self.spawn_task(async move {
            match client.update_comment(comment_id, &content).await {
                Ok(()) => TaskResult::CommentSaved { post_id },
                Err(e) => failed(&e, "Comment"),
            }
        });
    }

    pub fn request_delete_comment(&mut self) {
        let target = self.selected_comment().map(|comment| DeleteTarget::Comment {
            id: comment.id,
            post_id: comment.post_id,
        });
        if target.is_some() {
            self.pending_delete = target;
            self.state = AppState::ConfirmingDelete;
        }
    }

    // =========================================================================
    // Delete confirmation
    // =========================================================================

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(target) = self.pending_delete.take() else {
            return;
        };

        let client = self.client.clone();
        match target {
            DeleteTarget::Post { id, .. } => self.spawn_task(async move {
                match client.delete_post(id).await {
                    Ok(()) => TaskResult::PostDeleted(id),
                    Err(e) => failed(&e, "Post"),
                }
            }),
            DeleteTarget::Comment { id, post_id } => self.spawn_task(async move {
                match client.delete_comment(id).await {
                    Ok(()) => TaskResult::CommentDeleted { post_id },
                    Err(e) => failed(&e, "Comment"),
                }
            }),
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }
}

fn failed(error: &ApiError, what: &str) -> TaskResult {
    warn!(error = %error, what, "Request failed");
    TaskResult::Failed(error.user_message(what))
}

/// Message for the login form error line.
fn login_message(error: &ApiError) -> String {
    match error {
        ApiError::Unauthorized => "Invalid email or password".to_string(),
        e => e.user_message("Account"),
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_title_char(current_len: usize, c: char) -> bool {
    current_len < MAX_TITLE_LENGTH && is_valid_input_char(c)
}

/// Post content may contain line breaks.
pub fn can_add_content_char(current_len: usize, c: char) -> bool {
    current_len < MAX_CONTENT_LENGTH && (c == '\n' || is_valid_input_char(c))
}

pub fn can_add_comment_char(current_len: usize, c: char) -> bool {
    current_len < MAX_COMMENT_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use blogadmin_core::api::ApiClient;
    use blogadmin_core::auth::{MemoryTokenStore, SessionManager};
    use blogadmin_core::models::UserDirectory;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_app() -> App {
        // Nothing listens here; tests never reach the network
        let api = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let session = SessionManager::new(Arc::new(MemoryTokenStore::new()), Arc::new(api.clone()));
        let mut config = Config::default();
        config.last_email = Some("admin@example.com".to_string());
        App::new(config, AdminClient::new(api, session))
    }

    fn signed_in_app() -> App {
        let mut app = test_app();
        app.client.session().login();
        app.check_session();
        app
    }

    fn post(id: i64, published: bool) -> Post {
        Post {
            id,
            title: format!("Post {}", id),
            content: "Body".to_string(),
            is_published: published,
            created_at: None,
            updated_at: None,
        }
    }

    fn comment(id: i64, post_id: i64) -> Comment {
        Comment {
            id,
            content: format!("comment {}", id),
            post_id,
            user_id: 1,
            created_at: None,
        }
    }

    fn detail_for(post: Post, comments: Vec<Comment>) -> PostDetail {
        PostDetail {
            post,
            comments,
            authors: UserDirectory::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Session Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_start_without_session_shows_login() {
        let mut app = test_app();
        app.start();
        assert_eq!(app.state, AppState::LoggingIn);
        // Remembered email moves focus to the password field
        assert_eq!(app.login_focus, LoginFocus::Password);
    }

    #[test]
    fn test_session_end_shows_login_and_clears_data() {
        let mut app = test_app();
        app.client.session().login();
        app.check_session();
        assert_eq!(app.state, AppState::Normal);

        app.posts = vec![post(1, false)];
        app.detail = Some(detail_for(post(1, false), vec![]));
        app.view = View::Detail;

        // Ended elsewhere, e.g. a 401 or a background revocation
        app.client.session().logout();
        app.check_session();

        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.view, View::Posts);
        assert!(app.posts.is_empty());
        assert!(app.detail.is_none());
        assert!(app.login_error.is_some());
    }

    #[test]
    fn test_check_session_ignores_unchanged_state() {
        let mut app = test_app();
        app.state = AppState::ShowingHelp;
        app.check_session();
        assert_eq!(app.state, AppState::ShowingHelp);
    }

    #[test]
    fn test_login_requires_both_fields() {
        let mut app = test_app();
        app.login_password.clear();
        app.attempt_login();
        assert!(!app.login_in_progress);
        assert_eq!(app.login_error.as_deref(), Some("Email and password required"));
    }

    #[test]
    fn test_login_failure_message() {
        assert_eq!(login_message(&ApiError::Unauthorized), "Invalid email or password");
        assert_eq!(
            login_message(&ApiError::AccessDenied(String::new())),
            "Access denied - admin account required"
        );
    }

    // -------------------------------------------------------------------------
    // Task Result Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_publish_toggle_updates_list_and_detail() {
        let mut app = signed_in_app();
        app.posts = vec![post(1, false), post(2, false)];
        app.detail = Some(detail_for(post(2, false), vec![]));

        app.process_task_result(TaskResult::PublishToggled(post(2, true)));

        assert!(!app.posts[0].is_published);
        assert!(app.posts[1].is_published);
        assert!(app.detail.as_ref().unwrap().post.is_published);
        assert_eq!(app.status_message.as_deref(), Some("Post published"));
    }

    #[test]
    fn test_failed_toggle_leaves_status_unchanged() {
        let mut app = signed_in_app();
        app.posts = vec![post(1, false)];
        app.process_task_result(TaskResult::Failed("The server had a problem. Please try again.".into()));
        assert!(!app.posts[0].is_published);
    }

    #[test]
    fn test_deleted_post_returns_to_list() {
        let mut app = signed_in_app();
        app.posts = vec![post(1, true), post(2, true)];
        app.post_selection = 1;
        app.detail = Some(detail_for(post(2, true), vec![]));
        app.view = View::Detail;

        app.process_task_result(TaskResult::PostDeleted(2));

        assert_eq!(app.posts.len(), 1);
        assert_eq!(app.post_selection, 0);
        assert_eq!(app.view, View::Posts);
        assert!(app.detail.is_none());
    }

    #[test]
    fn test_detail_result_clamps_comment_selection() {
        let mut app = signed_in_app();
        app.comment_selection = 5;
        app.pending_detail = Some(1);
        app.process_task_result(TaskResult::Detail(detail_for(
            post(1, true),
            vec![comment(1, 1), comment(2, 1)],
        )));
        assert_eq!(app.view, View::Detail);
        assert_eq!(app.comment_selection, 1);
        assert_eq!(app.selected_comment().map(|c| c.id), Some(2));
    }

    #[test]
    fn test_late_detail_after_closing_is_ignored() {
        let mut app = signed_in_app();
        app.view = View::Detail;
        app.pending_detail = Some(1);
        app.close_detail();

        app.process_task_result(TaskResult::Detail(detail_for(post(1, true), vec![])));

        assert_eq!(app.view, View::Posts);
        assert!(app.detail.is_none());
    }

    #[test]
    fn test_detail_for_another_post_is_ignored() {
        let mut app = signed_in_app();
        app.pending_detail = Some(2);

        app.process_task_result(TaskResult::Detail(detail_for(post(1, true), vec![])));
        assert!(app.detail.is_none());

        app.process_task_result(TaskResult::Detail(detail_for(post(2, true), vec![])));
        assert_eq!(app.view, View::Detail);
        assert_eq!(app.detail.as_ref().map(|d| d.post.id), Some(2));
    }

    #[test]
    fn test_results_after_logout_are_ignored() {
        let mut app = signed_in_app();
        app.client.session().logout();
        app.check_session();
        assert_eq!(app.state, AppState::LoggingIn);

        app.process_task_result(TaskResult::Posts(vec![post(1, true)]));
        app.pending_detail = Some(1);
        app.process_task_result(TaskResult::Detail(detail_for(post(1, true), vec![])));

        assert!(app.posts.is_empty());
        assert!(app.detail.is_none());
        assert_eq!(app.view, View::Posts);
        assert_eq!(app.state, AppState::LoggingIn);
    }

    #[test]
    fn test_comment_result_after_leaving_detail_does_not_reload() {
        let mut app = signed_in_app();
        app.process_task_result(TaskResult::CommentDeleted { post_id: 1 });
        assert!(!app.loading);
        assert_eq!(app.pending_detail, None);
    }

    #[test]
    fn test_failure_while_editing_stays_in_form() {
        let mut app = signed_in_app();
        app.start_new_post();
        app.post_form.as_mut().unwrap().saving = true;

        app.process_task_result(TaskResult::Failed("Post not found".to_string()));

        assert_eq!(app.state, AppState::EditingPost);
        let form = app.post_form.as_ref().unwrap();
        assert!(!form.saving);
        assert_eq!(form.error.as_deref(), Some("Post not found"));
    }

    // -------------------------------------------------------------------------
    // Form Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_post_form_validation() {
        let mut app = test_app();
        app.start_new_post();
        app.save_post_form();
        assert_eq!(
            app.post_form.as_ref().unwrap().error.as_deref(),
            Some("Title is required")
        );

        app.post_form.as_mut().unwrap().title = "Hello".to_string();
        app.save_post_form();
        assert_eq!(
            app.post_form.as_ref().unwrap().error.as_deref(),
            Some("Content is required")
        );
    }

    #[test]
    fn test_edit_post_prefills_form() {
        let mut app = test_app();
        app.posts = vec![post(7, false)];
        app.start_edit_post();

        let form = app.post_form.as_ref().unwrap();
        assert_eq!(form.post_id, Some(7));
        assert_eq!(form.title, "Post 7");
        assert_eq!(form.heading(), " Edit Post ");
    }

    #[test]
    fn test_comment_form_rejects_blank_content() {
        let mut app = test_app();
        app.detail = Some(detail_for(post(1, true), vec![comment(3, 1)]));
        app.view = View::Detail;
        app.start_edit_comment();
        app.comment_form.as_mut().unwrap().content = "   ".to_string();
        app.save_comment_form();

        let form = app.comment_form.as_ref().unwrap();
        assert!(!form.saving);
        assert_eq!(form.error.as_deref(), Some("Comment cannot be empty"));
    }

    #[test]
    fn test_delete_requests_target_selection() {
        let mut app = test_app();
        app.detail = Some(detail_for(post(1, true), vec![comment(3, 1), comment(4, 1)]));
        app.view = View::Detail;
        app.comment_selection = 1;

        app.request_delete_comment();
        assert_eq!(app.state, AppState::ConfirmingDelete);
        assert_eq!(app.pending_delete, Some(DeleteTarget::Comment { id: 4, post_id: 1 }));

        app.cancel_delete();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.pending_delete.is_none());

        app.request_delete_post();
        assert!(matches!(app.pending_delete, Some(DeleteTarget::Post { id: 1, .. })));
    }

    #[test]
    fn test_post_form_focus_cycle() {
        assert_eq!(PostFormFocus::Title.next(), PostFormFocus::Content);
        assert_eq!(PostFormFocus::Button.next(), PostFormFocus::Title);
        assert_eq!(PostFormFocus::Title.prev(), PostFormFocus::Button);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(99, '@'));
        assert!(!can_add_email_char(100, 'a'));
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\x00'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_content_allows_newlines() {
        assert!(can_add_content_char(0, '\n'));
        assert!(!can_add_content_char(0, '\t'));
        assert!(!can_add_title_char(0, '\n'));
        assert!(!can_add_comment_char(MAX_COMMENT_LENGTH, 'a'));
    }
}
