//! Core library for the blog administration client.
//!
//! Holds everything that is not terminal UI: the credential codec and
//! store, the session manager, the REST client, data models and config.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;
