use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::utils::format::format_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "postId")]
    pub post_id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

impl Comment {
    pub fn created_display(&self) -> String {
        self.created_at
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// A comment author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: String,
}

/// Request body for editing a comment.
#[derive(Debug, Clone, Serialize)]
pub struct CommentUpdate<'a> {
    pub content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentsResponse {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<User>,
}

/// Unique author ids of the given comments, in first-seen order.
pub fn author_ids(comments: &[Comment]) -> Vec<i64> {
    let mut ids = Vec::new();
    for comment in comments {
        if !ids.contains(&comment.user_id) {
            ids.push(comment.user_id);
        }
    }
    ids
}

/// Lookup of usernames by user id.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    names: HashMap<i64, String>,
}

impl UserDirectory {
    pub fn from_users(users: Vec<User>) -> Self {
        Self {
            names: users.into_iter().map(|u| (u.id, u.username)).collect(),
        }
    }

    /// Username for an id, or an empty string when unknown.
    pub fn username(&self, user_id: i64) -> &str {
        self.names.get(&user_id).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: i64, user_id: i64) -> Comment {
        Comment {
            id,
            content: format!("comment {}", id),
            post_id: 1,
            user_id,
            created_at: None,
        }
    }

    #[test]
    fn test_parse_comments_response() {
        let json = r#"{"comments": [{"id": 4, "content": "Nice", "postId": 2, "userId": 8,
            "createdAt": "2024-01-02T03:04:05Z"}]}"#;
        let parsed: CommentsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.comments.len(), 1);
        let c = &parsed.comments[0];
        assert_eq!(c.post_id, 2);
        assert_eq!(c.user_id, 8);
        assert_eq!(c.created_display(), "Jan 02, 2024 03:04");
    }

    #[test]
    fn test_author_ids_deduplicates() {
        let comments = vec![comment(1, 5), comment(2, 3), comment(3, 5)];
        assert_eq!(author_ids(&comments), vec![5, 3]);
        assert!(author_ids(&[]).is_empty());
    }

    #[test]
    fn test_user_directory() {
        let users: UsersResponse =
            serde_json::from_str(r#"{"users": [{"id": 5, "username": "ada"}, {"id": 3, "username": "bob"}]}"#)
                .unwrap();
        let directory = UserDirectory::from_users(users.users);
        assert_eq!(directory.username(5), "ada");
        assert_eq!(directory.username(3), "bob");
        assert_eq!(directory.username(99), "");
    }

    #[test]
    fn test_comment_update_body() {
        let body = serde_json::to_value(CommentUpdate { content: "edited" }).unwrap();
        assert_eq!(body, serde_json::json!({ "content": "edited" }));
    }
}
