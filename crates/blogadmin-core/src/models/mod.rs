//! Data models for blog entities.
//!
//! This module contains the records exchanged with the backend:
//!
//! - `Post`, `PostDraft`: posts and the create/update body
//! - `Comment`, `CommentUpdate`: comments and the edit body
//! - `User`, `UserDirectory`: comment authors
//! - Response envelopes (`{"posts": [...]}` and friends)

pub mod comment;
pub mod post;

pub use comment::{author_ids, Comment, CommentUpdate, CommentsResponse, User, UserDirectory, UsersResponse};
pub use post::{Post, PostDraft, PostResponse, PostsResponse, PublishStatus};
