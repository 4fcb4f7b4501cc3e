/// Authentication context and bearer-credential extraction
///
/// The principal resolver seam: a bearer credential comes in on the
/// Authorization header, an [`AuthContext`] naming the authenticated
/// user goes into request extensions, or the request fails as
/// unauthenticated. Handlers never accept a caller-supplied identity;
/// they read the principal from this context only.
///
/// The Axum middleware function itself lives in the API crate's router
/// (it needs application state for the token secret and the user
/// lookup); this module provides the pieces it is built from.
use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

/// Authentication context added to request extensions
///
/// Present on a request if and only if the bearer token validated and
/// the subject still names an existing user.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use tasknest_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id (the principal)
    pub user_id: i64,
}

impl AuthContext {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

/// Error type for principal resolution
///
/// The HTTP status mapping lives with the API crate's error type;
/// every variant except `DatabaseError` answers as unauthenticated.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    InvalidToken(String),

    /// Token was valid but its subject no longer exists
    #[error("Could not validate credentials")]
    UnknownUser,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Extracts the bearer token from the Authorization header
///
/// # Errors
///
/// - `MissingCredentials` when the header is absent or not valid UTF-8
/// - `InvalidFormat` when the header carries a non-Bearer scheme
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );

        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_non_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwdw=="),
        );

        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_auth_context_carries_principal() {
        let auth = AuthContext::new(17);
        assert_eq!(auth.user_id, 17);
    }
}
