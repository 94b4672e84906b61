use serde::{Deserialize, Serialize};

use crate::utils::format::format_timestamp;

/// A blog post as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "isPublished", default)]
    pub is_published: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

impl Post {
    pub fn status(&self) -> PublishStatus {
        PublishStatus::from(self.is_published)
    }

    /// Label for the action that flips the publish state
    pub fn toggle_label(&self) -> &'static str {
        if self.is_published {
            "Unpublish"
        } else {
            "Publish"
        }
    }

    pub fn created_display(&self) -> String {
        self.created_at
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Body for an update that keeps title and content and sets the publish flag.
    pub fn publish_draft(&self, published: bool) -> PostDraft {
        PostDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            is_published: Some(published),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    Published,
    Unpublished,
}

impl From<bool> for PublishStatus {
    fn from(published: bool) -> Self {
        if published {
            PublishStatus::Published
        } else {
            PublishStatus::Unpublished
        }
    }
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStatus::Published => write!(f, "Published"),
            PublishStatus::Unpublished => write!(f, "Unpublished"),
        }
    }
}

/// Request body for creating or updating a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(rename = "isPublished", skip_serializing_if = "Option::is_none", default)]
    pub is_published: Option<bool>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            is_published: None,
        }
    }

    /// Both fields are required by the backend.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("Title is required");
        }
        if self.content.trim().is_empty() {
            return Err("Content is required");
        }
        Ok(())
    }
}

// API response envelopes

#[derive(Debug, Clone, Deserialize)]
pub struct PostsResponse {
    #[serde(default)]
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostResponse {
    pub post: Post,
}
