//! Authentication module for the operator's session.
//!
//! This module provides:
//! - `token`: expiry extraction from a credential (no signature check)
//! - `TokenStore`: persistent storage for the single credential string
//! - `SessionManager`: the authenticated/unauthenticated state, with
//!   login/logout/validate and background verification against the backend
//!
//! Credentials are JWTs issued by `POST /login`; their `exp` claim decides
//! local expiry.

pub mod session;
pub mod store;
pub mod token;

pub use session::{AccountVerifier, SessionManager, SessionState, Verification};
pub use store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, StoreError, TokenStore};
pub use token::TokenError;
