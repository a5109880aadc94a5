//! Port for the device's persistent key-value credential storage.
//!
//! The store knows nothing about sessions; it only maps string keys to
//! string values. Key naming lives in [`crate::domain::session`].

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential store adapters.
    pub enum CredentialStoreError {
        /// Backing storage could not be reached or written.
        Unavailable { message: String } =>
            "credential store unavailable: {message}",
        /// Stored data could not be parsed.
        Corrupt { message: String } =>
            "credential store data is corrupt: {message}",
    }
}

/// Persistent get/set/remove contract over string keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a value. Missing keys yield `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, CredentialStoreError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialStoreError>;

    /// Remove a value. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<(), CredentialStoreError>;
}

/// In-memory store for fixtures and tests.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl InMemoryCredentialStore {
    /// Store pre-populated with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    fn with_entries_mut<T>(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>) -> T,
    ) -> Result<T, CredentialStoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| CredentialStoreError::unavailable(err.to_string()))?;
        Ok(apply(&mut entries))
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CredentialStoreError> {
        self.with_entries_mut(|entries| entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialStoreError> {
        self.with_entries_mut(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    async fn remove(&self, key: &str) -> Result<(), CredentialStoreError> {
        self.with_entries_mut(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = InMemoryCredentialStore::default();
        store.set("authToken", "abc").await.expect("set");
        assert_eq!(
            store.get("authToken").await.expect("get"),
            Some("abc".to_owned())
        );
    }

    #[rstest]
    #[tokio::test]
    async fn removing_missing_keys_succeeds() {
        let store = InMemoryCredentialStore::with_entries([("userId", "42")]);
        store.remove("authToken").await.expect("remove missing");
        store.remove("userId").await.expect("remove present");
        assert!(store.snapshot().is_empty());
    }
}
