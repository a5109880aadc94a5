//! Credential store adapters.

mod atomic_write;
mod file_store;

pub use file_store::FileCredentialStore;
