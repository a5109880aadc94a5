//! Driven port for role-routed profile endpoints.

use async_trait::async_trait;

use crate::domain::{AuthToken, Profile, ResourcePath, Role};

use super::BackendError;

/// Profile reads and writes against paths chosen by the role router.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// `GET` the profile at `path`, decoding it for `role`.
    async fn fetch_profile(
        &self,
        path: &ResourcePath,
        role: Role,
        token: &AuthToken,
    ) -> Result<Profile, BackendError>;

    /// `PUT` the profile to `path`.
    async fn update_profile(
        &self,
        path: &ResourcePath,
        profile: &Profile,
        token: &AuthToken,
    ) -> Result<(), BackendError>;
}
