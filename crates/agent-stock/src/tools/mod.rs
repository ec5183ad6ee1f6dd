//! Tools exposed to the stock agents

pub mod stock_data;
pub mod web_search;

pub use stock_data::StockDataTool;
pub use web_search::WebSearchTool;
