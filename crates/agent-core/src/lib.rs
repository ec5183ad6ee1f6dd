//! Core abstractions shared by the stock-agent workspace
//!
//! Defines the `Agent` trait, the per-run `Context`, and the error type that
//! every other crate converts into at its boundary.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
