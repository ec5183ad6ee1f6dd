//! Tool framework for the stock agent
//!
//! Tools are the functions a model may call during a run: the stock data
//! fetcher and web search in this workspace.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, parse_params};
