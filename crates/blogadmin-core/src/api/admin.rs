//! Session-gated access to the backend.
//!
//! Every protected call goes through `AdminClient`, which asks the session
//! manager for a valid credential first and maps the backend's answer the
//! same way for every endpoint: a 401 ends the session, a 404 comes back as
//! `ApiError::NotFound`, anything else non-2xx as a generic failure.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::auth::{token, SessionManager};
use crate::models::{author_ids, Comment, Post, PostDraft, User, UserDirectory};

use super::{ApiClient, ApiError};

/// A post with its comments and their authors.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub authors: UserDirectory,
}

#[derive(Clone)]
pub struct AdminClient {
    api: ApiClient,
    session: Arc<SessionManager>,
}

impl AdminClient {
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Log in with email and password, storing the issued credential.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let credential = self.api.login(email, password).await?;

        if token::is_expired(&credential, Utc::now()) {
            return Err(ApiError::InvalidResponse(
                "Backend issued an expired or unreadable token".to_string(),
            ));
        }

        self.session
            .begin(&credential)
            .map_err(|e| ApiError::InvalidResponse(format!("Could not store credential: {}", e)))?;
        info!(email, "Logged in");
        Ok(())
    }

    pub fn logout(&self) {
        self.session.logout();
        info!("Logged out");
    }

    /// Valid credential for a protected call, or `NotAuthenticated`.
    fn credential(&self) -> Result<String, ApiError> {
        self.session.validate().ok_or(ApiError::NotAuthenticated)
    }

    /// Apply the session consequences of a backend answer.
    fn settle<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(ApiError::Unauthorized) = result {
            warn!("Backend rejected credential, ending session");
            self.session.logout();
        }
        result
    }

    // ===== Posts =====

    pub async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let token = self.credential()?;
        self.settle(self.api.fetch_posts(&token).await)
    }

    pub async fn get_post(&self, post_id: i64) -> Result<Post, ApiError> {
        let token = self.credential()?;
        self.settle(self.api.fetch_post(&token, post_id).await)
    }

    pub async fn create_post(&self, draft: &PostDraft) -> Result<(), ApiError> {
        let token = self.credential()?;
        self.settle(self.api.create_post(&token, draft).await)
    }

    pub async fn update_post(&self, post_id: i64, draft: &PostDraft) -> Result<(), ApiError> {
        let token = self.credential()?;
        self.settle(self.api.update_post(&token, post_id, draft).await)
    }

    /// Set the publish flag; the updated post is returned only once the
    /// backend has accepted the change.
    pub async fn set_published(&self, post: &Post, published: bool) -> Result<Post, ApiError> {
        let token = self.credential()?;
        self.settle(
            self.api
                .update_post(&token, post.id, &post.publish_draft(published))
                .await,
        )?;
        Ok(Post {
            is_published: published,
            ..post.clone()
        })
    }

    pub async fn delete_post(&self, post_id: i64) -> Result<(), ApiError> {
        let token = self.credential()?;
        self.settle(self.api.delete_post(&token, post_id).await)
    }

    // ===== Comments =====

    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, ApiError> {
        let token = self.credential()?;
        self.settle(self.api.fetch_comments(&token, post_id).await)
    }

    pub async fn update_comment(&self, comment_id: i64, content: &str) -> Result<(), ApiError> {
        let token = self.credential()?;
        self.settle(self.api.update_comment(&token, comment_id, content).await)
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<(), ApiError> {
        let token = self.credential()?;
        self.settle(self.api.delete_comment(&token, comment_id).await)
    }

    // ===== Users =====

    /// Resolve users by id. No request is made for an empty list.
    pub async fn resolve_users(&self, user_ids: &[i64]) -> Result<Vec<User>, ApiError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let token = self.credential()?;
        self.settle(self.api.fetch_users(&token, user_ids).await)
    }

    /// Fetch a post and its comments concurrently, then resolve the authors.
    ///
    /// Author lookup failures other than a 401 leave names blank.
    pub async fn load_post_detail(&self, post_id: i64) -> Result<PostDetail, ApiError> {
        let token = self.credential()?;

        let (post, comments) = tokio::join!(
            self.api.fetch_post(&token, post_id),
            self.api.fetch_comments(&token, post_id),
        );
        let post = self.settle(post)?;
        let comments = self.settle(comments)?;

        let ids = author_ids(&comments);
        let authors = if ids.is_empty() {
            UserDirectory::default()
        } else {
            match self.settle(self.api.fetch_users(&token, &ids).await) {
                Ok(users) => UserDirectory::from_users(users),
                Err(e) if e.is_unauthorized() => return Err(e),
                Err(e) => {
                    warn!(error = %e, post_id, "Failed to resolve comment authors");
                    UserDirectory::default()
                }
            }
        };

        Ok(PostDetail {
            post,
            comments,
            authors,
        })
    }
}
