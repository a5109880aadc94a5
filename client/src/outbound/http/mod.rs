//! HTTP adapter for the Report IT backend.
//!
//! [`HttpBackend`] implements the account, ticket, and profile API ports
//! over one reqwest client. Wire shapes live in `dto` and never leave this
//! module.

mod backend;
mod dto;

pub use backend::HttpBackend;
