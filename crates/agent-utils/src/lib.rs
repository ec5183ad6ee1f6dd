//! Shared utilities for the stock agent
//!
//! Logging setup and environment loading used by the binaries of the
//! workspace.

pub mod env;
pub mod logging;

pub use env::{EnvError, env_parse, env_var, load_dotenv};
pub use logging::init_tracing;
