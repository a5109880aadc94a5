//! Errors shared by the backend API ports.

use super::define_port_error;

define_port_error! {
    /// Failures reported by backend adapters.
    pub enum BackendError {
        /// The request never produced a response.
        Transport { message: String } =>
            "backend transport failed: {message}",
        /// The request exceeded the configured timeout.
        Timeout { message: String } =>
            "backend request timed out: {message}",
        /// The backend refused the bearer token or credentials.
        Unauthorized { status: u16, message: String } =>
            "backend refused credentials with status {status}: {message}",
        /// The backend answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "backend rejected request with status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "backend response could not be decoded: {message}",
    }
}

impl BackendError {
    /// Message supplied by the server, when the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message, .. } | Self::Rejected { message, .. } => {
                let trimmed = message.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            Self::Transport { .. } | Self::Timeout { .. } | Self::Decode { .. } => None,
        }
    }

    /// Whether the request reached the server.
    pub const fn reached_server(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::Rejected { .. } | Self::Decode { .. }
        )
    }
}
