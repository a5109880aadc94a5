//! Inbound adapters driving the domain.
//!
//! - **cli**: clap front end executing one command per process.

pub mod cli;
