//! Error types for Slack API calls.
//!
//! Errors are categorized so the CLI can show advice for them.

use std::fmt;

/// Result type alias for Slack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of Slack errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport failure or server error.
    Network,
    /// Rate limited by the API.
    RateLimited,
    /// Token missing, invalid, revoked or lacking a scope.
    Auth,
    /// The API rejected the call.
    Api,
    /// Response could not be understood.
    Format,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::RateLimited => "Rate limited",
            Self::Auth => "Authentication failed",
            Self::Api => "Slack rejected the request",
            Self::Format => "Unexpected response",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and try again",
            Self::RateLimited => "Wait a minute and run again, or lower --jobs",
            Self::Auth => {
                "Check SLACK_TOKEN and that the app has usergroups:read, usergroups:write and users:read"
            }
            Self::Api => "Check the error code in the Slack API documentation",
            Self::Format => "The API may have changed, run with -vv for details",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Error codes Slack uses for token problems.
const AUTH_CODES: &[&str] = &[
    "not_authed",
    "invalid_auth",
    "account_inactive",
    "token_revoked",
    "token_expired",
    "missing_scope",
    "no_permission",
];

/// Errors that can occur while talking to Slack.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The API answered with `ok: false`.
    #[error("{method}: {code}")]
    Api {
        /// API method, e.g. `usergroups.create`.
        method: String,
        /// Slack error code, e.g. `name_already_exists`.
        code: String,
    },

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// No token was configured.
    #[error("no Slack token configured (set SLACK_TOKEN or `token` in config)")]
    MissingToken,
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// Create an API error.
    pub fn api(method: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Api {
            method: method.into(),
            code: code.into(),
        }
    }

    /// Get the error category, used to pick operator advice.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http {
                status: Some(429), ..
            } => ErrorCategory::RateLimited,
            Error::Http {
                status: Some(401 | 403),
                ..
            } => ErrorCategory::Auth,
            Error::Http { .. } => ErrorCategory::Network,
            Error::Api { code, .. } if code == "ratelimited" => ErrorCategory::RateLimited,
            Error::Api { code, .. } if AUTH_CODES.contains(&code.as_str()) => ErrorCategory::Auth,
            Error::Api { .. } => ErrorCategory::Api,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::MissingToken => ErrorCategory::Auth,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {code}"),
                status: Some(code),
            },
            ureq::Error::Json(err) => Self::InvalidResponse(err.to_string()),
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
