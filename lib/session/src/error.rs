//! Error types for the session crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ClientError`: Faults reported by the identity client
//! - `AuthError`: Session controller failures, classified for the admin panel
//! - `HttpError`: Failures of authorized HTTP requests
//! - `PlatformError`: Browser location and session storage failures
//!
//! `ClientError` is `Clone` because one initialization or redirect outcome
//! is handed to every waiter.

use std::fmt;

/// Errors reported by the identity client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No token can be issued without user interaction.
    InteractionRequired { reason: String },
    /// The client was used before its startup handshake completed.
    Uninitialized,
    /// The client could not reach the identity provider.
    Network { details: String },
    /// The identity provider rejected the request.
    Provider { code: String, details: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InteractionRequired { reason } => {
                write!(f, "interaction required: {reason}")
            }
            Self::Uninitialized => write!(f, "identity client is not initialized"),
            Self::Network { details } => {
                write!(f, "identity provider unreachable: {details}")
            }
            Self::Provider { code, details } => {
                write!(f, "identity provider error '{code}': {details}")
            }
        }
    }
}

impl std::error::Error for ClientError {}

/// Failures of the auth session controller.
///
/// The variants follow the classification the admin panel acts on:
/// `Silent` keeps the UI quiet while a redirect is underway, `Unauthorized`
/// sends the user to the login page, `AuthenticationFailed` is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A login redirect is in flight; nothing should be shown.
    Silent,
    /// No usable session, or the API answered 401/403.
    Unauthorized,
    /// The redirect round trip did not yield an account.
    AuthenticationFailed,
    /// The identity client's startup handshake failed.
    Initialization { details: String },
    /// The identity client failed while serving a request.
    Client { operation: &'static str, details: String },
    /// Browser location or storage could not be used.
    Platform { details: String },
    /// The adapter configuration is invalid.
    InvalidConfig { reason: String },
    /// A permission or identity strategy failed.
    Derivation { details: String },
}

impl AuthError {
    /// Wraps an identity client fault raised during `operation`.
    #[must_use]
    pub fn client(operation: &'static str, error: &ClientError) -> Self {
        Self::Client {
            operation,
            details: error.to_string(),
        }
    }

    /// Returns the message the admin panel should display.
    ///
    /// `Silent` carries no message.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Silent => None,
            other => Some(other.to_string()),
        }
    }

    /// Returns true for the silent failure.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Silent)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => write!(f, "login redirect in progress"),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::AuthenticationFailed => write!(f, "Authentication failed"),
            Self::Initialization { details } => {
                write!(f, "identity client initialization failed: {details}")
            }
            Self::Client { operation, details } => {
                write!(f, "identity client failed during {operation}: {details}")
            }
            Self::Platform { details } => write!(f, "browser platform error: {details}"),
            Self::InvalidConfig { reason } => write!(f, "invalid auth configuration: {reason}"),
            Self::Derivation { details } => write!(f, "derivation failed: {details}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<PlatformError> for AuthError {
    fn from(error: PlatformError) -> Self {
        Self::Platform {
            details: error.to_string(),
        }
    }
}

/// Failures of authorized HTTP requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The server answered with a non-2xx status.
    Status {
        status: u16,
        message: String,
        body: String,
    },
    /// The request could not be built, sent, or read.
    Transport { details: String },
    /// A token could not be obtained for the request.
    Authorization { details: String },
}

impl HttpError {
    /// Returns the HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Authorization { .. } => None,
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status {
                status, message, ..
            } => write!(f, "HTTP {status}: {message}"),
            Self::Transport { details } => write!(f, "HTTP transport error: {details}"),
            Self::Authorization { details } => {
                write!(f, "could not authorize request: {details}")
            }
        }
    }
}

impl std::error::Error for HttpError {}

/// Browser platform failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// No window or session storage in this environment.
    Unavailable,
    /// Session storage rejected a write.
    Storage { key: String, details: String },
    /// The browser refused to navigate.
    Navigation { url: String, details: String },
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "browser platform unavailable"),
            Self::Storage { key, details } => {
                write!(f, "session storage write to '{key}' failed: {details}")
            }
            Self::Navigation { url, details } => {
                write!(f, "navigation to '{url}' failed: {details}")
            }
        }
    }
}

impl std::error::Error for PlatformError {}
