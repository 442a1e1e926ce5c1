//! CSV-backed stock price data access
//!
//! The loader parses the source file once, validates it, and memoizes
//! per-stock subsets; all caches are invalidated together when the file's
//! modification time advances.

mod loader;
mod model;

pub use loader::{CumulativeReturn, StockDataLoader};
pub use model::StockPriceRecord;
