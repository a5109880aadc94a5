//! Report IT client library.
//!
//! The domain layer owns sessions, role routing, and the ticket workflow.
//! Outbound adapters reach the backend over HTTP and keep credentials in a
//! JSON file; the inbound CLI drives both.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
