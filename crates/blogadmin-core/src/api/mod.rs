//! REST access to the blog backend.
//!
//! `ApiClient` performs the raw calls with an explicit bearer token.
//! `AdminClient` wraps it with the session: it supplies the stored
//! credential and ends the session when the backend answers 401.

pub mod admin;
pub mod client;
pub mod error;

#[cfg(test)]
mod test_backend;

pub use admin::{AdminClient, PostDetail};
pub use client::ApiClient;
pub use error::ApiError;
