//! HTTP API
//!
//! Routes (stocks endpoints are mounted under `/api/stocks`):
//! - `GET  /health`
//! - `GET  /api/stocks/` — all stock names
//! - `GET  /api/stocks/{name}/prices?skip=&limit=` — paginated history
//! - `GET  /api/stocks/{name}/prices/{date}` — price at an exact date
//! - `POST /api/stocks/{name}/returns` — cumulative return over a window

pub mod handlers;
mod server;
mod types;

pub use server::router;
pub use types::{CumulativeReturnRequest, CumulativeReturnResponse, HealthResponse, PriceQuery};
