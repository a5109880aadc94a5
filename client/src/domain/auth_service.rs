//! Account flows: login, logout, registration, OTP confirmation, and
//! password reset.
//!
//! This service is the only writer of the session keys in the credential
//! store. Everything else reads them through
//! [`crate::domain::SessionResolver`].

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use super::ports::{AuthApi, BackendError, CredentialStore, CredentialStoreError, LoginResponse};
use super::session::{AUTH_TOKEN_KEY, SESSION_KEYS, USER_ID_KEY, USER_NAME_KEY, USER_TYPE_KEY};
use super::{
    AuthToken, Error, LoginCredentials, OtpVerification, PasswordReset, PasswordResetRequest,
    Registration, RegistrationForm, Role, Session, UserId,
};

const BEARER_PREFIX: &str = "Bearer ";
const GREETING_FALLBACK_NAME: &str = "User";

const LOGIN_FAILED: &str = "Login failed. Please check your username and password.";
const TOKEN_MISSING: &str = "Token not found in response.";
const REGISTRATION_FAILED: &str = "Registration failed.";
const OTP_FAILED: &str = "An error occurred while verifying OTP.";
const OTP_REJECTED: &str = "Invalid OTP.";
const USERNAME_NOT_FOUND: &str = "Username not found. Please try again.";
const RESET_REJECTED: &str = "Invalid OTP";

/// Notice shown after registration.
pub const REGISTERED_MESSAGE: &str = "OTP has been sent to your email.";
/// Notice shown after OTP confirmation.
pub const OTP_VERIFIED_MESSAGE: &str = "OTP verified successfully!";
/// Notice shown after a reset OTP has been requested.
pub const RESET_REQUESTED_MESSAGE: &str = "A password reset OTP has been sent to your email.";
/// Notice shown after a password reset.
pub const PASSWORD_RESET_MESSAGE: &str = "Password reset successful. You can now log in.";

/// Account use cases over an [`AuthApi`] and a [`CredentialStore`].
#[derive(Clone)]
pub struct AuthService<A, S> {
    api: Arc<A>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<A, S> AuthService<A, S>
where
    A: AuthApi,
    S: CredentialStore,
{
    /// Create the service.
    pub fn new(api: Arc<A>, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { api, store, clock }
    }

    /// Authenticate and persist the resulting session.
    ///
    /// All four session keys are written before the session is returned.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, Error> {
        let credentials = LoginCredentials::try_from_parts(username, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let response = self.api.login(&credentials).await.map_err(|err| match err {
            BackendError::Unauthorized { .. } | BackendError::Rejected { .. } => {
                Error::unauthorized(LOGIN_FAILED)
            }
            BackendError::Transport { .. } | BackendError::Timeout { .. } => {
                Error::network("An error occurred. Please try again.")
            }
            BackendError::Decode { message } => {
                Error::internal(format!("Unexpected login response: {message}"))
            }
        })?;
        let session = session_from_login(response)?;

        let entries = [
            (AUTH_TOKEN_KEY, session.token().expose()),
            (USER_NAME_KEY, credentials.username()),
            (USER_ID_KEY, session.user_id().as_ref()),
            (USER_TYPE_KEY, session.role().stored_value()),
        ];
        for (key, value) in entries {
            if let Err(err) = self.store.set(key, value).await {
                self.discard_partial_session().await;
                return Err(storage_error(err));
            }
        }
        info!(user_id = %session.user_id(), role = %session.role(), "logged in");
        Ok(session)
    }

    /// Remove every session key from the device.
    pub async fn logout(&self) -> Result<(), Error> {
        for key in SESSION_KEYS {
            self.store.remove(key).await.map_err(storage_error)?;
        }
        info!("logged out");
        Ok(())
    }

    /// Best-effort removal after a failed login write, so a new token never
    /// pairs with a previous account's id or role.
    async fn discard_partial_session(&self) {
        for key in SESSION_KEYS {
            if let Err(err) = self.store.remove(key).await {
                warn!(key, error = %err, "could not discard partial session");
            }
        }
    }

    /// Home screen greeting for the stored user name.
    pub async fn greeting(&self) -> String {
        let stored = match self.store.get(USER_NAME_KEY).await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "could not read stored user name");
                None
            }
        };
        let name = stored
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(GREETING_FALLBACK_NAME);
        format!("Hello {name}, Welcome to Report IT!")
    }

    /// Validate and submit a registration form. The backend emails an OTP.
    pub async fn register(&self, form: &RegistrationForm) -> Result<&'static str, Error> {
        let today = self.clock.local().date_naive();
        let registration = Registration::try_from_form(form, today)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.api
            .register(&registration)
            .await
            .map_err(|err| map_account_error(&err, REGISTRATION_FAILED, REGISTRATION_FAILED))?;
        info!(role = %registration.profile().role, "registration submitted");
        Ok(REGISTERED_MESSAGE)
    }

    /// Confirm a registration with the emailed OTP.
    pub async fn verify_otp(&self, username: &str, otp: &str) -> Result<&'static str, Error> {
        let verification = OtpVerification::try_from_parts(username, otp)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.api
            .verify_otp(&verification)
            .await
            .map_err(|err| map_account_error(&err, OTP_REJECTED, OTP_FAILED))?;
        Ok(OTP_VERIFIED_MESSAGE)
    }

    /// Ask the backend to email a password reset OTP.
    pub async fn request_password_reset(&self, username: &str) -> Result<&'static str, Error> {
        let request = PasswordResetRequest::try_from_username(username)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.api
            .request_password_reset(&request)
            .await
            .map_err(|err| map_account_error(&err, USERNAME_NOT_FOUND, USERNAME_NOT_FOUND))?;
        Ok(RESET_REQUESTED_MESSAGE)
    }

    /// Complete a password reset with the emailed OTP.
    pub async fn reset_password(
        &self,
        username: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<&'static str, Error> {
        let reset = PasswordReset::try_from_parts(username, otp, new_password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.api
            .reset_password(&reset)
            .await
            .map_err(|err| map_account_error(&err, RESET_REJECTED, RESET_REJECTED))?;
        Ok(PASSWORD_RESET_MESSAGE)
    }
}

fn session_from_login(response: LoginResponse) -> Result<Session, Error> {
    let token = response
        .token
        .as_deref()
        .map(strip_bearer)
        .and_then(|raw| AuthToken::new(raw).ok())
        .ok_or_else(|| Error::unauthorized(TOKEN_MISSING))?;
    let role_claim = response
        .role
        .ok_or_else(|| Error::configuration("Login response did not include a role."))?;
    let role = Role::from_server_claim(&role_claim)?;
    let user_id = response
        .user_id
        .and_then(|raw| UserId::new(raw).ok())
        .ok_or_else(|| Error::internal("Login response did not include a user id."))?;
    Ok(Session::new(token, user_id, role))
}

/// Drop a leading `Bearer ` from a token, if present.
fn strip_bearer(raw: &str) -> &str {
    let leading = raw.trim_start();
    leading.strip_prefix(BEARER_PREFIX).unwrap_or(leading).trim()
}

fn map_account_error(err: &BackendError, rejected: &str, unreachable: &str) -> Error {
    match err {
        BackendError::Unauthorized { .. } | BackendError::Rejected { .. } => {
            Error::network(err.server_message().unwrap_or(rejected))
        }
        BackendError::Transport { .. } | BackendError::Timeout { .. } => {
            Error::network(unreachable)
        }
        BackendError::Decode { message } => {
            Error::internal(format!("Unexpected response from the server: {message}"))
        }
    }
}

fn storage_error(err: CredentialStoreError) -> Error {
    warn!(error = %err, "credential store write failed");
    Error::internal("Could not update the session stored on this device.")
}
