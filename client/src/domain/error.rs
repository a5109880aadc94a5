//! Domain-level error types.
//!
//! These errors are transport agnostic. The CLI renders them as notices; a
//! graphical front end would map them to inline messages or dialogs. Every
//! controller operation reports failure through [`Error`], tagged with a
//! stable [`ErrorCode`] so callers never have to parse message text.

use std::fmt;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Local validation failed; no request was sent.
    InvalidRequest,
    /// The backend rejected the supplied credentials.
    Unauthorized,
    /// The stored session is missing or the backend no longer accepts it.
    SessionExpired,
    /// The session's role may not perform this action.
    Forbidden,
    /// The backend was unreachable or answered with a failure status.
    Network,
    /// A recent successful submission is still cooling down.
    Cooldown,
    /// A role or setting outside the known set was encountered.
    Configuration,
    /// An unexpected error occurred inside the client.
    InternalError,
}

impl ErrorCode {
    /// Message used when a caller supplies a blank one.
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "The request is invalid.",
            Self::Unauthorized => "Login failed. Please check your username and password.",
            Self::SessionExpired => "User information or token not found. Please log in again.",
            Self::Forbidden => "You are not allowed to perform this action.",
            Self::Network => "An error occurred. Please try again.",
            Self::Cooldown => "Please wait before submitting again.",
            Self::Configuration => "The client is misconfigured.",
            Self::InternalError => "An unexpected error occurred.",
        }
    }
}

/// Validation errors emitted by the checked constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValidationError {
    EmptyMessage,
}

impl fmt::Display for ErrorValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for ErrorValidationError {}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace. [`Error::new`]
///   substitutes [`ErrorCode::default_message`] for blank input so server
///   supplied text can be passed through without checks at every call site.
///
/// # Examples
/// ```
/// use reportit::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::Network, "  ");
/// assert_eq!(err.code(), ErrorCode::Network);
/// assert_eq!(err.message(), "An error occurred. Please try again.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Create a new error, falling back to the code's default message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: code.default_message().to_owned(),
        })
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self { code, message })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message suitable for display.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Whether the caller should send the user back to authentication.
    pub fn requires_login(&self) -> bool {
        self.code == ErrorCode::SessionExpired
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::SessionExpired`].
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SessionExpired, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::Network`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Network, message)
    }

    /// Convenience constructor for [`ErrorCode::Cooldown`].
    pub fn cooldown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Cooldown, message)
    }

    /// Convenience constructor for [`ErrorCode::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Configuration, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests;
