//! Authentication primitives: login credentials, OTP checks, and password
//! reset requests.
//!
//! Constructors validate raw form input so services only ever hand checked
//! values to the backend ports.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use zeroize::Zeroizing;

/// Characters accepted as the "special" character in a reset password.
const RESET_PASSWORD_SPECIALS: &str = "!@#$%^&*";
/// Minimum length of a reset password.
pub const RESET_PASSWORD_MIN_LEN: usize = 8;

/// Validation failures for the authentication forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
    /// OTP field on the registration confirmation form was blank.
    MissingOtp,
    /// OTP field on the password reset form was blank.
    MissingResetOtp,
    /// Reset password failed the strength rules.
    WeakResetPassword,
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "Username is required"),
            Self::EmptyPassword => write!(f, "Password is required"),
            Self::MissingOtp => write!(f, "Please enter the OTP"),
            Self::MissingResetOtp => write!(f, "OTP is required"),
            Self::WeakResetPassword => write!(
                f,
                "Password must be at least {RESET_PASSWORD_MIN_LEN} characters with one special character"
            ),
        }
    }
}

impl std::error::Error for AuthValidationError {}

fn normalized_username(raw: &str) -> Result<String, AuthValidationError> {
    let normalized = raw.trim();
    if normalized.is_empty() {
        return Err(AuthValidationError::EmptyUsername);
    }
    Ok(normalized.to_owned())
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace.
///
/// # Examples
/// ```
/// use reportit::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "s3cret!").unwrap();
/// assert_eq!(creds.username(), "ada");
/// assert_eq!(creds.password(), "s3cret!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, AuthValidationError> {
        let username = normalized_username(username)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username sent to the backend and stored for greetings.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// One-time password confirming a new registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpVerification {
    username: String,
    otp: Zeroizing<String>,
}

impl OtpVerification {
    /// Validate the OTP confirmation form.
    pub fn try_from_parts(username: &str, otp: &str) -> Result<Self, AuthValidationError> {
        let otp = otp.trim();
        if otp.is_empty() {
            return Err(AuthValidationError::MissingOtp);
        }
        Ok(Self {
            username: normalized_username(username)?,
            otp: Zeroizing::new(otp.to_owned()),
        })
    }

    /// Account being confirmed.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// One-time password.
    pub fn otp(&self) -> &str {
        self.otp.as_str()
    }
}

/// Request for a password reset OTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetRequest {
    username: String,
}

impl PasswordResetRequest {
    /// Validate the forgot-password form.
    pub fn try_from_username(username: &str) -> Result<Self, AuthValidationError> {
        Ok(Self {
            username: normalized_username(username)?,
        })
    }

    /// Account whose password is being reset.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }
}

static RESET_PASSWORD_RE: OnceLock<Regex> = OnceLock::new();

fn reset_password_regex() -> &'static Regex {
    RESET_PASSWORD_RE.get_or_init(|| {
        // The special-character requirement is checked separately.
        let pattern = r"^[A-Za-z0-9!@#$%^&*]{8,}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("reset password regex failed to compile: {error}"))
    })
}

/// Completed password reset: OTP plus the new password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    username: String,
    otp: Zeroizing<String>,
    new_password: Zeroizing<String>,
}

impl PasswordReset {
    /// Validate the reset verification form.
    ///
    /// The OTP is checked before the password so the first problem on the
    /// form is the one reported.
    pub fn try_from_parts(
        username: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<Self, AuthValidationError> {
        let username = normalized_username(username)?;
        let otp = otp.trim();
        if otp.is_empty() {
            return Err(AuthValidationError::MissingResetOtp);
        }
        let has_special = new_password
            .chars()
            .any(|ch| RESET_PASSWORD_SPECIALS.contains(ch));
        if !has_special || !reset_password_regex().is_match(new_password) {
            return Err(AuthValidationError::WeakResetPassword);
        }
        Ok(Self {
            username,
            otp: Zeroizing::new(otp.to_owned()),
            new_password: Zeroizing::new(new_password.to_owned()),
        })
    }

    /// Account whose password is being reset.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// OTP received by email.
    pub fn otp(&self) -> &str {
        self.otp.as_str()
    }

    /// Replacement password.
    pub fn new_password(&self) -> &str {
        self.new_password.as_str()
    }
}
