//! Bounded-retry session lookup over the credential store.
//!
//! Login writes the token asynchronously, so a screen that opens straight
//! after login can read storage before the write lands. The resolver polls a
//! fixed number of times before reporting the session as absent.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::ports::{CredentialStore, CredentialStoreError, RetrySleeper};
use super::session::{AUTH_TOKEN_KEY, USER_ID_KEY, USER_TYPE_KEY};
use super::{AuthToken, Error, Role, Session, UserId};

/// Total token read attempts before giving up.
pub const MAX_TOKEN_ATTEMPTS: u32 = 3;
/// Pause between token read attempts.
pub const TOKEN_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Message shown when no usable session is stored.
pub const SESSION_ABSENT_MESSAGE: &str =
    "User information or token not found. Please log in again.";

/// Reads the current session from the credential store.
#[derive(Clone)]
pub struct SessionResolver<S> {
    store: Arc<S>,
    sleeper: Arc<dyn RetrySleeper>,
}

impl<S> SessionResolver<S>
where
    S: CredentialStore,
{
    /// Create a resolver over a store, pausing through `sleeper` between
    /// attempts.
    pub fn new(store: Arc<S>, sleeper: Arc<dyn RetrySleeper>) -> Self {
        Self { store, sleeper }
    }

    /// Resolve the stored session, or `None` when any part is missing.
    ///
    /// Never fails: storage errors are logged and treated as absence.
    pub async fn resolve(&self) -> Option<Session> {
        let token = self.read_token_with_retry().await?;
        let user_id = self
            .read(USER_ID_KEY)
            .await
            .and_then(|raw| UserId::new(raw).ok());
        let Some(user_id) = user_id else {
            debug!("stored session has no user id");
            return None;
        };
        let stored_role = self.read(USER_TYPE_KEY).await?;
        match Role::from_stored(&stored_role) {
            Ok(role) => Some(Session::new(token, user_id, role)),
            Err(err) => {
                warn!(error = %err, "stored session has an unrecognised role");
                None
            }
        }
    }

    /// Resolve the stored session, failing with
    /// [`crate::domain::ErrorCode::SessionExpired`] when it is absent.
    pub async fn require(&self) -> Result<Session, Error> {
        self.resolve()
            .await
            .ok_or_else(|| Error::session_expired(SESSION_ABSENT_MESSAGE))
    }

    async fn read_token_with_retry(&self) -> Option<AuthToken> {
        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            if let Some(token) = self
                .read(AUTH_TOKEN_KEY)
                .await
                .and_then(|raw| AuthToken::new(raw).ok())
            {
                return Some(token);
            }
            debug!(attempt, max_attempts = MAX_TOKEN_ATTEMPTS, "auth token not yet stored");
            if attempt < MAX_TOKEN_ATTEMPTS {
                self.sleeper.sleep(TOKEN_RETRY_INTERVAL).await;
            }
        }
        None
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(err) => {
                log_store_failure(key, &err);
                None
            }
        }
    }
}

fn log_store_failure(key: &str, err: &CredentialStoreError) {
    warn!(key, error = %err, "credential store read failed");
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{InMemoryCredentialStore, MockCredentialStore};
    use crate::test_support::RecordingSleeper;
    use rstest::rstest;

    fn resolver_over<S: CredentialStore>(
        store: S,
    ) -> (SessionResolver<S>, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::default());
        (
            SessionResolver::new(Arc::new(store), sleeper.clone()),
            sleeper,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn complete_session_resolves_without_sleeping() {
        let (resolver, sleeper) = resolver_over(InMemoryCredentialStore::with_entries([
            (AUTH_TOKEN_KEY, "abc"),
            (USER_ID_KEY, "CT21-0001"),
            (USER_TYPE_KEY, "student"),
        ]));

        let session = resolver.resolve().await.expect("session");
        assert_eq!(session.token().expose(), "abc");
        assert_eq!(session.user_id().as_ref(), "CT21-0001");
        assert_eq!(session.role(), Role::Student);
        assert!(sleeper.recorded().is_empty());
    }

    #[rstest]
    #[case::missing(None)]
    #[case::empty(Some(""))]
    #[case::placeholder(Some("null"))]
    #[tokio::test]
    async fn unusable_token_is_retried_then_absent(#[case] token: Option<&str>) {
        let mut entries = vec![(USER_ID_KEY, "42"), (USER_TYPE_KEY, "employee")];
        if let Some(token) = token {
            entries.push((AUTH_TOKEN_KEY, token));
        }
        let (resolver, sleeper) = resolver_over(InMemoryCredentialStore::with_entries(entries));

        assert!(resolver.resolve().await.is_none());
        assert_eq!(
            sleeper.recorded(),
            vec![TOKEN_RETRY_INTERVAL; (MAX_TOKEN_ATTEMPTS - 1) as usize]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn token_arriving_on_a_later_attempt_is_used() {
        let mut store = MockCredentialStore::new();
        let mut token_reads = 0_u32;
        store.expect_get().returning(move |key| {
            let value = match key {
                AUTH_TOKEN_KEY => {
                    token_reads += 1;
                    (token_reads >= 2).then(|| "late-token".to_owned())
                }
                USER_ID_KEY => Some("42".to_owned()),
                USER_TYPE_KEY => Some("misStaff".to_owned()),
                _ => None,
            };
            Ok(value)
        });
        let (resolver, sleeper) = resolver_over(store);

        let session = resolver.resolve().await.expect("session");
        assert_eq!(session.role(), Role::Staff);
        assert_eq!(sleeper.recorded(), vec![TOKEN_RETRY_INTERVAL]);
    }

    #[rstest]
    #[case::no_user_id(vec![(AUTH_TOKEN_KEY, "abc"), (USER_TYPE_KEY, "student")])]
    #[case::no_role(vec![(AUTH_TOKEN_KEY, "abc"), (USER_ID_KEY, "42")])]
    #[case::unknown_role(vec![(AUTH_TOKEN_KEY, "abc"), (USER_ID_KEY, "42"), (USER_TYPE_KEY, "admin")])]
    #[tokio::test]
    async fn incomplete_sessions_are_absent(#[case] entries: Vec<(&'static str, &'static str)>) {
        let (resolver, _) = resolver_over(InMemoryCredentialStore::with_entries(entries));
        assert!(resolver.resolve().await.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn storage_failures_are_treated_as_absence() {
        let mut store = MockCredentialStore::new();
        store
            .expect_get()
            .returning(|_| Err(CredentialStoreError::unavailable("disk offline")));
        let (resolver, sleeper) = resolver_over(store);

        assert!(resolver.resolve().await.is_none());
        assert_eq!(sleeper.recorded().len(), (MAX_TOKEN_ATTEMPTS - 1) as usize);
    }

    #[rstest]
    #[tokio::test]
    async fn require_maps_absence_to_session_expired() {
        let (resolver, _) = resolver_over(InMemoryCredentialStore::default());
        let err = resolver.require().await.expect_err("absent session");
        assert_eq!(err.code(), ErrorCode::SessionExpired);
        assert_eq!(err.message(), SESSION_ABSENT_MESSAGE);
    }
}
