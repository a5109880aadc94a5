//! Driven port for the backend's account endpoints.

use async_trait::async_trait;

use crate::domain::{
    LoginCredentials, OtpVerification, PasswordReset, PasswordResetRequest, Registration,
};

use super::BackendError;

/// Raw login answer before it is turned into a session.
///
/// Fields stay optional here; the auth service decides which absences are
/// errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginResponse {
    /// Token from the `Authorization` header, falling back to the body.
    /// May still carry a `Bearer ` prefix.
    pub token: Option<String>,
    /// Account id.
    pub user_id: Option<String>,
    /// Role claim such as `ROLE_STUDENT`.
    pub role: Option<String>,
}

/// Account endpoints under `/user`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /user/login`.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, BackendError>;

    /// `POST /user/register`; the backend emails an OTP on success.
    async fn register(&self, registration: &Registration) -> Result<(), BackendError>;

    /// `POST /user/verify-otp`.
    async fn verify_otp(&self, verification: &OtpVerification) -> Result<(), BackendError>;

    /// `POST /user/forgot-password`.
    async fn request_password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<(), BackendError>;

    /// `POST /user/verify-forgot-password`.
    async fn reset_password(&self, reset: &PasswordReset) -> Result<(), BackendError>;
}
