//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest-backed client for the Report IT REST backend.
//! - **credentials**: cap-std backed JSON file holding the session keys.
//!
//! Adapters are thin translators between domain types and wire or storage
//! representations. They contain no business logic.

pub mod credentials;
pub mod http;
