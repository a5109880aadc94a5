//! Profile loading and change-detected editing.

use std::sync::Arc;

use tracing::{debug, info};

use super::ports::ProfileApi;
use super::ticket_workflow::map_backend_error;
use super::{Error, Profile, Session, route_for};

/// Notice shown when a draft matches the stored profile.
pub const NO_CHANGES_MESSAGE: &str = "No changes were made to the profile.";
/// Notice shown after a successful save.
pub const PROFILE_UPDATED_MESSAGE: &str = "Profile updated successfully";

const LOAD_FAILED: &str = "An error occurred while fetching profile data. Please try again.";
const UPDATE_FAILED: &str = "Failed to update profile.";

/// Result of [`ProfileEditor::edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEditOutcome {
    /// The draft was saved.
    Updated(Profile),
    /// The draft matched the current profile; nothing was sent.
    Unchanged,
}

impl ProfileEditOutcome {
    /// Notice to show the user.
    pub const fn notice(&self) -> &'static str {
        match self {
            Self::Updated(_) => PROFILE_UPDATED_MESSAGE,
            Self::Unchanged => NO_CHANGES_MESSAGE,
        }
    }
}

/// Reads and writes the session account's profile through role routing.
#[derive(Clone)]
pub struct ProfileEditor<P> {
    api: Arc<P>,
}

impl<P> ProfileEditor<P>
where
    P: ProfileApi,
{
    /// Create an editor over a profile API.
    pub fn new(api: Arc<P>) -> Self {
        Self { api }
    }

    /// Load the profile from the role's read endpoint.
    pub async fn load(&self, session: &Session) -> Result<Profile, Error> {
        let path = route_for(session.role())
            .read_endpoint()
            .expand(session.user_id());
        debug!(%path, "loading profile");
        self.api
            .fetch_profile(&path, session.role(), session.token())
            .await
            .map_err(|err| map_backend_error(&err, LOAD_FAILED, LOAD_FAILED))
    }

    /// Save `draft` if it differs from `current`.
    ///
    /// Identical drafts return [`ProfileEditOutcome::Unchanged`] without a
    /// request, so repeated calls are idempotent.
    pub async fn edit(
        &self,
        session: &Session,
        current: &Profile,
        draft: Profile,
    ) -> Result<ProfileEditOutcome, Error> {
        if draft.role != session.role() {
            return Err(Error::invalid_request(format!(
                "A {} profile cannot be saved from a {} session.",
                route_for(draft.role).label(),
                route_for(session.role()).label()
            )));
        }
        let changed = current.changed_fields(&draft);
        if changed.is_empty() {
            return Ok(ProfileEditOutcome::Unchanged);
        }

        let path = route_for(session.role())
            .update_endpoint()
            .expand(session.user_id());
        self.api
            .update_profile(&path, &draft, session.token())
            .await
            .map_err(|err| map_backend_error(&err, UPDATE_FAILED, UPDATE_FAILED))?;
        info!(%path, fields = ?changed, "profile updated");
        Ok(ProfileEditOutcome::Updated(draft))
    }
}
