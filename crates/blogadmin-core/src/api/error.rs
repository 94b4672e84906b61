use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not logged in or session expired")]
    NotAuthenticated,

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True when the backend no longer accepts the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::NotAuthenticated | ApiError::Unauthorized)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// Short message for display next to the failed action.
    ///
    /// `what` names the resource, e.g. "Post" or "Comments".
    pub fn user_message(&self, what: &str) -> String {
        match self {
            ApiError::NotAuthenticated | ApiError::Unauthorized => {
                "Unauthorized - please log in again".to_string()
            }
            ApiError::AccessDenied(_) => "Access denied - admin account required".to_string(),
            ApiError::NotFound(_) => format!("{} not found", what),
            ApiError::RateLimited => "Too many requests - please wait a moment".to_string(),
            ApiError::ServerError(_) => "The server had a problem. Please try again.".to_string(),
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(_) => {
                "Unable to connect to server. Check your connection.".to_string()
            }
            ApiError::InvalidResponse(_) => "Unexpected response from server".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(ApiError::from_status(StatusCode::UNAUTHORIZED, ""), ApiError::Unauthorized));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::AccessDenied(ref b) if b == "nope"
        ));
        assert!(matches!(ApiError::from_status(StatusCode::NOT_FOUND, ""), ApiError::NotFound(_)));
        assert!(matches!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""), ApiError::RateLimited));
        assert!(matches!(ApiError::from_status(StatusCode::BAD_GATEWAY, ""), ApiError::ServerError(_)));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "missing title"),
            ApiError::InvalidResponse(ref m) if m.contains("400") && m.contains("missing title")
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("520 total bytes"));

        // Never splits a multi-byte character
        let wide = "é".repeat(MAX_ERROR_BODY_LENGTH);
        let truncated = ApiError::truncate_body(&wide);
        assert!(truncated.contains("truncated"));
    }

    #[test]
    fn test_user_message() {
        assert_eq!(ApiError::NotFound(String::new()).user_message("Post"), "Post not found");
        assert_eq!(
            ApiError::Unauthorized.user_message("Post"),
            "Unauthorized - please log in again"
        );
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(ApiError::NotAuthenticated.is_unauthorized());
        assert!(!ApiError::AccessDenied(String::new()).is_unauthorized());
        assert!(ApiError::NotFound(String::new()).is_not_found());
    }
}
