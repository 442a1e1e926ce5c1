//! API request/response types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Query parameters for the paginated price list.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

/// Body of `POST /api/stocks/{name}/returns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulativeReturnRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Response of `POST /api/stocks/{name}/returns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulativeReturnResponse {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cumulative_return: f64,
    pub start_price: f64,
    pub end_price: f64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
