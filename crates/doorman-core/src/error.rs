//! Login error taxonomy.
//!
//! Every failure of a login attempt maps to exactly one `AuthError` variant,
//! and every variant the user can see maps to one fixed message.

use thiserror::Error;

/// Shown when either field is blank.
pub const VALIDATION_MESSAGE: &str = "Please fill in both fields";
/// Shown when the server answered 2xx without a usable token.
pub const UNEXPECTED_RESPONSE_MESSAGE: &str =
    "Unexpected response from server. Please try again later.";
/// Shown on HTTP 401.
pub const REJECTED_MESSAGE: &str = "Invalid username or password";
/// Shown on HTTP 400.
pub const BAD_REQUEST_MESSAGE: &str = "Invalid request. Please check your input.";
/// Shown on HTTP 500.
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
/// Shown for every other failure.
pub const GENERIC_MESSAGE: &str = "An error occurred. Please try again later.";

/// Longest slice of a response body kept for diagnostics.
const MAX_BODY_EXCERPT: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Username or password blank after trimming. No request was sent.
    #[error("username and password are required")]
    Validation,
    /// The transport succeeded but the payload carried no token.
    #[error("login response did not contain a token")]
    UnexpectedResponse,
    /// HTTP 401.
    #[error("credentials rejected (HTTP 401)")]
    Rejected,
    /// HTTP 400.
    #[error("request rejected as malformed (HTTP 400)")]
    BadRequest,
    /// HTTP 500.
    #[error("server error (HTTP 500)")]
    Server,
    /// Any other status, a network failure or a timeout.
    #[error("transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },
    /// A submission is already outstanding for this form.
    #[error("a login request is already in flight")]
    InFlight,
    /// The submission was cancelled before it completed.
    #[error("login cancelled")]
    Cancelled,
    /// The token arrived but the session could not be written.
    #[error("failed to persist session: {0}")]
    Storage(String),
}

impl AuthError {
    /// Maps a non-success HTTP status to its error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => AuthError::Rejected,
            400 => AuthError::BadRequest,
            500 => AuthError::Server,
            _ => {
                let excerpt = body_excerpt(body);
                let message = if excerpt.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {excerpt}")
                };
                AuthError::Transport {
                    status: Some(status),
                    message,
                }
            }
        }
    }

    /// A request that never produced a status line.
    pub fn network(message: impl Into<String>) -> Self {
        AuthError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn timed_out() -> Self {
        Self::network("request timed out")
    }

    /// The fixed message rendered under the form, if any.
    ///
    /// `InFlight` and `Cancelled` are silent: the first leaves the current
    /// message alone and the second happens when nobody is looking.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            AuthError::Validation => Some(VALIDATION_MESSAGE),
            AuthError::UnexpectedResponse => Some(UNEXPECTED_RESPONSE_MESSAGE),
            AuthError::Rejected => Some(REJECTED_MESSAGE),
            AuthError::BadRequest => Some(BAD_REQUEST_MESSAGE),
            AuthError::Server => Some(SERVER_ERROR_MESSAGE),
            AuthError::Transport { .. } | AuthError::Storage(_) => Some(GENERIC_MESSAGE),
            AuthError::InFlight | AuthError::Cancelled => None,
        }
    }

    /// Short machine-readable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Validation => "validation",
            AuthError::UnexpectedResponse => "unexpected_response",
            AuthError::Rejected => "rejected",
            AuthError::BadRequest => "bad_request",
            AuthError::Server => "server",
            AuthError::Transport { .. } => "transport",
            AuthError::InFlight => "in_flight",
            AuthError::Cancelled => "cancelled",
            AuthError::Storage(_) => "storage",
        }
    }
}

fn body_excerpt(body: &str) -> &str {
    let body = body.trim();
    if body.len() <= MAX_BODY_EXCERPT {
        return body;
    }
    let mut end = MAX_BODY_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_statuses_map_to_fixed_messages() {
        assert_eq!(
            AuthError::from_status(401, "").user_message(),
            Some("Invalid username or password")
        );
        assert_eq!(
            AuthError::from_status(400, "").user_message(),
            Some("Invalid request. Please check your input.")
        );
        assert_eq!(
            AuthError::from_status(500, "").user_message(),
            Some("Server error. Please try again later.")
        );
    }

    #[test]
    fn test_other_statuses_are_generic_transport_errors() {
        for status in [403, 404, 418, 502, 503] {
            let err = AuthError::from_status(status, "nope");
            assert!(matches!(
                err,
                AuthError::Transport {
                    status: Some(s),
                    ..
                } if s == status
            ));
            assert_eq!(err.user_message(), Some(GENERIC_MESSAGE));
        }
    }

    #[test]
    fn test_transport_message_keeps_short_body_excerpt() {
        let long_body = "x".repeat(1000);
        let AuthError::Transport { message, .. } = AuthError::from_status(502, &long_body) else {
            panic!("expected transport error");
        };
        assert!(message.starts_with("HTTP 502: "));
        assert!(message.len() < 300);
    }

    #[test]
    fn test_body_excerpt_respects_char_boundaries() {
        let body = "é".repeat(150);
        let excerpt = body_excerpt(&body);
        assert!(excerpt.len() <= MAX_BODY_EXCERPT);
        assert!(excerpt.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_silent_errors_have_no_message() {
        assert_eq!(AuthError::InFlight.user_message(), None);
        assert_eq!(AuthError::Cancelled.user_message(), None);
        assert_eq!(AuthError::timed_out().user_message(), Some(GENERIC_MESSAGE));
    }
}
