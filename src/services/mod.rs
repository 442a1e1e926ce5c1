//! Services Layer
//!
//! Business logic between the HTTP handlers and the data loader. Handlers
//! stay thin: they validate request parameters and map service output to
//! responses, while services own pagination and response shaping.

pub mod stock_service;

pub use stock_service::{StockPriceList, StockService};
