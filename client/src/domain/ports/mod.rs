//! Domain ports for the hexagonal boundary.
//!
//! Driven ports cover the backend's HTTP surface, the device credential
//! store, and the pause used between retries.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_api;
mod backend_error;
mod credential_store;
mod profile_api;
mod retry_sleeper;
mod ticket_api;

#[cfg(test)]
pub use auth_api::MockAuthApi;
pub use auth_api::{AuthApi, LoginResponse};
pub use backend_error::BackendError;
#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialStore, CredentialStoreError, InMemoryCredentialStore};
#[cfg(test)]
pub use profile_api::MockProfileApi;
pub use profile_api::ProfileApi;
pub use retry_sleeper::{RetrySleeper, TokioSleeper};
#[cfg(test)]
pub use ticket_api::MockTicketApi;
pub use ticket_api::{TicketApi, UpdateAck};
