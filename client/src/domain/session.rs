//! Session identity: the credential, account id, and role of the device user.
//!
//! A [`Session`] is only constructed when all three parts are present, so an
//! incomplete set of stored credentials can never masquerade as a session.

use std::fmt;

use zeroize::Zeroizing;

use super::Role;

/// Credential store key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Credential store key holding the account id.
pub const USER_ID_KEY: &str = "userId";
/// Credential store key holding the stored role value.
pub const USER_TYPE_KEY: &str = "userType";
/// Credential store key holding the login name used for greetings.
pub const USER_NAME_KEY: &str = "userName";

/// Every key written at login and cleared at logout.
pub const SESSION_KEYS: [&str; 4] = [AUTH_TOKEN_KEY, USER_ID_KEY, USER_TYPE_KEY, USER_NAME_KEY];

/// Literal some storage layers write for an unset token.
const TOKEN_PLACEHOLDER: &str = "null";

/// Validation errors for session parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValidationError {
    /// Token was empty or the `null` placeholder.
    MissingToken,
    /// User id was blank.
    EmptyUserId,
}

impl fmt::Display for SessionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => write!(f, "token must not be empty"),
            Self::EmptyUserId => write!(f, "user id must not be empty"),
        }
    }
}

impl std::error::Error for SessionValidationError {}

/// Opaque bearer token. Zeroed on drop and redacted from `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Validate a raw token, rejecting blanks and the `null` placeholder.
    ///
    /// # Examples
    /// ```
    /// use reportit::domain::AuthToken;
    ///
    /// assert!(AuthToken::new("abc").is_ok());
    /// assert!(AuthToken::new("null").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionValidationError> {
        let raw = Zeroizing::new(raw.into());
        if !Self::is_usable(raw.as_str()) {
            return Err(SessionValidationError::MissingToken);
        }
        Ok(Self(raw))
    }

    /// Whether a stored value can serve as a token.
    pub fn is_usable(raw: &str) -> bool {
        let trimmed = raw.trim();
        !trimmed.is_empty() && trimmed != TOKEN_PLACEHOLDER
    }

    /// Raw token text.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Server-assigned account id (a student or employee number, for instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`], trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SessionValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SessionValidationError::EmptyUserId);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Authenticated identity of the current device user.
///
/// ## Invariants
/// - token, user id and role are all present and non-empty.
/// - never mutated in place; a new login replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: AuthToken,
    user_id: UserId,
    role: Role,
}

impl Session {
    /// Assemble a session from validated parts.
    pub fn new(token: AuthToken, user_id: UserId, role: Role) -> Self {
        Self {
            token,
            user_id,
            role,
        }
    }

    /// Bearer token for authorised requests.
    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    /// Account id the session belongs to.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role of the account.
    pub fn role(&self) -> Role {
        self.role
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("null")]
    fn unusable_tokens_are_rejected(#[case] raw: &str) {
        assert_eq!(
            AuthToken::new(raw).expect_err("unusable token"),
            SessionValidationError::MissingToken
        );
    }

    #[rstest]
    fn token_debug_output_is_redacted() {
        let token = AuthToken::new("super-secret").expect("token");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
        assert_eq!(token.expose(), "super-secret");
    }

    #[rstest]
    #[case("  CT21-0001 ", "CT21-0001")]
    #[case("42", "42")]
    fn user_ids_are_trimmed(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(UserId::new(raw).expect("user id").as_ref(), expected);
    }

    #[rstest]
    fn blank_user_ids_are_rejected() {
        assert_eq!(
            UserId::new(" ").expect_err("blank id"),
            SessionValidationError::EmptyUserId
        );
    }

    #[rstest]
    fn session_keys_cover_every_persisted_field() {
        assert_eq!(
            SESSION_KEYS,
            ["authToken", "userId", "userType", "userName"]
        );
    }
}
