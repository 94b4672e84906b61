//! API client for communicating with the blog REST backend.
//!
//! This module provides the `ApiClient` struct for the raw backend calls.
//! Every authenticated method takes the bearer token explicitly; session
//! handling lives in [`AdminClient`](super::AdminClient).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::{AccountVerifier, Verification};
use crate::config::Config;
use crate::models::{
    Comment, CommentUpdate, CommentsResponse, Post, PostDraft, PostResponse, PostsResponse, User,
    UsersResponse,
};

use super::ApiError;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// API client for the blog backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
}

impl ApiClient {
    /// Create a new API client for `base_url` (without trailing slash)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.backend_url(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json")
            .bearer_auth(token)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, "Request rejected");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder, what: &str) -> Result<T, ApiError> {
        let response = Self::check_response(request.send().await?).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    /// Send a request whose response body is not needed.
    async fn send_empty(request: RequestBuilder) -> Result<(), ApiError> {
        let response = Self::check_response(request.send().await?).await?;
        // Drain the body so the connection can be reused
        let _ = response.bytes().await;
        Ok(())
    }

    // ===== Authentication =====

    /// Exchange email and password for a credential
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url("/login"))
            .header(header::ACCEPT, "application/json")
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        let parsed: LoginResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse login response: {}", e)))?;

        parsed
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("Login response has no token".to_string()))
    }

    /// Ask the backend whether the credential still belongs to an admin
    pub async fn verify_user(&self, token: &str) -> Result<Verification, ApiError> {
        let response = self
            .request(Method::GET, "/verify-user", token)
            .send()
            .await?;

        match response.status().as_u16() {
            200..=299 => Ok(Verification::Privileged),
            401 | 403 => Ok(Verification::Revoked),
            _ => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::from_status(status, &body))
            }
        }
    }

    // ===== Posts =====

    pub async fn fetch_posts(&self, token: &str) -> Result<Vec<Post>, ApiError> {
        let parsed: PostsResponse =
            Self::send_json(self.request(Method::GET, "/posts", token), "posts").await?;
        debug!(count = parsed.posts.len(), "Posts fetched");
        Ok(parsed.posts)
    }

    pub async fn fetch_post(&self, token: &str, post_id: i64) -> Result<Post, ApiError> {
        let path = format!("/posts/{}", post_id);
        let parsed: PostResponse = Self::send_json(self.request(Method::GET, &path, token), "post").await?;
        Ok(parsed.post)
    }

    pub async fn create_post(&self, token: &str, draft: &PostDraft) -> Result<(), ApiError> {
        Self::send_empty(self.request(Method::POST, "/posts/", token).json(draft)).await
    }

    pub async fn update_post(&self, token: &str, post_id: i64, draft: &PostDraft) -> Result<(), ApiError> {
        let path = format!("/posts/{}", post_id);
        Self::send_empty(self.request(Method::PUT, &path, token).json(draft)).await
    }

    pub async fn delete_post(&self, token: &str, post_id: i64) -> Result<(), ApiError> {
        let path = format!("/posts/{}", post_id);
        Self::send_empty(self.request(Method::DELETE, &path, token)).await
    }

    // ===== Comments =====

    pub async fn fetch_comments(&self, token: &str, post_id: i64) -> Result<Vec<Comment>, ApiError> {
        let path = format!("/posts/{}/comments", post_id);
        let parsed: CommentsResponse =
            Self::send_json(self.request(Method::GET, &path, token), "comments").await?;
        debug!(post_id, count = parsed.comments.len(), "Comments fetched");
        Ok(parsed.comments)
    }

    pub async fn update_comment(&self, token: &str, comment_id: i64, content: &str) -> Result<(), ApiError> {
        let path = format!("/comments/{}", comment_id);
        Self::send_empty(
            self.request(Method::PUT, &path, token)
                .json(&CommentUpdate { content }),
        )
        .await
    }

    pub async fn delete_comment(&self, token: &str, comment_id: i64) -> Result<(), ApiError> {
        let path = format!("/comments/{}", comment_id);
        Self::send_empty(self.request(Method::DELETE, &path, token)).await
    }

    // ===== Users =====

    /// Resolve user records for the given ids
    pub async fn fetch_users(&self, token: &str, user_ids: &[i64]) -> Result<Vec<User>, ApiError> {
        let ids = user_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!("/users?ids={}", ids);
        let parsed: UsersResponse = Self::send_json(self.request(Method::GET, &path, token), "users").await?;
        Ok(parsed.users)
    }
}

#[async_trait]
impl AccountVerifier for ApiClient {
    async fn verify(&self, credential: &str) -> Result<Verification, ApiError> {
        self.verify_user(credential).await
    }
}
