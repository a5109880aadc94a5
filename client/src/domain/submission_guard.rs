//! Cooldown policy that disables a submit trigger after success.
//!
//! The guard is time-based and stateless apart from the instant it was last
//! engaged. Callers pass "now" in explicitly, normally from a
//! [`mockable::Clock`], so tests can step time without sleeping.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;

use super::Error;

/// Window during which a trigger stays disabled after a successful action.
pub const SUBMISSION_COOLDOWN: Duration = Duration::from_secs(5);

/// Disable-after-success guard for a single trigger.
///
/// Failed actions never engage the guard, so the user can retry at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionGuard {
    cooldown: Duration,
    engaged_at: Option<DateTime<Utc>>,
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new(SUBMISSION_COOLDOWN)
    }
}

impl SubmissionGuard {
    /// Guard with a custom cooldown window.
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            engaged_at: None,
        }
    }

    /// Whether the trigger accepts input at `now`.
    pub fn is_enabled(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now).is_none()
    }

    /// Time left before the trigger re-enables, if it is disabled.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use chrono::{TimeZone, Utc};
    /// use reportit::domain::SubmissionGuard;
    ///
    /// let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().unwrap();
    /// let mut guard = SubmissionGuard::default();
    /// guard.engage(start);
    /// let later = start + chrono::Duration::seconds(2);
    /// assert_eq!(guard.remaining(later), Some(Duration::from_secs(3)));
    /// ```
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let engaged_at = self.engaged_at?;
        let Ok(cooldown) = chrono::Duration::from_std(self.cooldown) else {
            return None;
        };
        let reopens_at = engaged_at + cooldown;
        (now < reopens_at)
            .then(|| (reopens_at - now).to_std().ok())
            .flatten()
    }

    /// Start the cooldown window at `now`.
    pub fn engage(&mut self, now: DateTime<Utc>) {
        self.engaged_at = Some(now);
    }

    /// Run `action` unless the guard is cooling down.
    ///
    /// A refused run returns [`crate::domain::ErrorCode::Cooldown`] without
    /// polling `action`. A successful run engages the guard at the moment the
    /// action completes.
    pub async fn run<T, F>(&mut self, clock: &dyn Clock, action: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if let Some(remaining) = self.remaining(clock.utc()) {
            return Err(Error::cooldown(format!(
                "Please wait {} more second(s) before submitting again.",
                remaining.as_secs().max(1)
            )));
        }
        let value = action.await?;
        self.engage(clock.utc());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::test_support::MutableClock;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[fixture]
    fn clock() -> MutableClock {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        MutableClock::new(start)
    }

    #[rstest]
    fn fresh_guard_is_enabled(clock: MutableClock) {
        assert!(SubmissionGuard::default().is_enabled(clock.utc()));
    }

    #[rstest]
    #[case(0, false)]
    #[case(4, false)]
    #[case(5, true)]
    #[case(9, true)]
    fn guard_reenables_after_cooldown(
        clock: MutableClock,
        #[case] elapsed_secs: i64,
        #[case] enabled: bool,
    ) {
        let mut guard = SubmissionGuard::default();
        guard.engage(clock.utc());
        clock.advance_seconds(elapsed_secs);
        assert_eq!(guard.is_enabled(clock.utc()), enabled);
    }

    #[rstest]
    #[tokio::test]
    async fn successful_run_engages_guard(clock: MutableClock) {
        let mut guard = SubmissionGuard::default();
        let value = guard
            .run(&clock, async { Ok::<_, Error>(7) })
            .await
            .expect("first run");
        assert_eq!(value, 7);
        assert!(!guard.is_enabled(clock.utc()));
    }

    #[rstest]
    #[tokio::test]
    async fn failed_run_leaves_guard_enabled(clock: MutableClock) {
        let mut guard = SubmissionGuard::default();
        let result = guard
            .run(&clock, async { Err::<(), _>(Error::network("offline")) })
            .await;
        assert!(result.is_err());
        assert!(guard.is_enabled(clock.utc()));
    }

    #[rstest]
    #[tokio::test]
    async fn cooling_guard_never_polls_the_action(clock: MutableClock) {
        let mut guard = SubmissionGuard::default();
        guard.engage(clock.utc());
        let polls = AtomicUsize::new(0);
        let err = guard
            .run(&clock, async {
                polls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(())
            })
            .await
            .expect_err("cooling down");
        assert_eq!(err.code(), ErrorCode::Cooldown);
        assert_eq!(polls.load(Ordering::SeqCst), 0);
    }
}
