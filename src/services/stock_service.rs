//! Stock Service
//!
//! Shapes loader output into response-sized pieces: pagination over per-stock
//! price history, point lookups, and the cumulative-return calculation.

use crate::data::{CumulativeReturn, StockDataLoader, StockPriceRecord};
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A page of price records plus the unpaginated total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockPriceList {
    pub data: Vec<StockPriceRecord>,
    pub total: usize,
}

/// Read-only stock data operations backed by the CSV loader.
///
/// Holds the loader behind an `Arc` so the same cached table serves every
/// request; tests substitute a loader pointed at a fixture file.
#[derive(Clone)]
pub struct StockService {
    loader: Arc<StockDataLoader>,
}

impl StockService {
    pub fn new(loader: Arc<StockDataLoader>) -> Self {
        Self { loader }
    }

    /// All stock names, first-occurrence order.
    pub fn list_stocks(&self) -> Result<Vec<String>> {
        self.loader.unique_stocks()
    }

    /// Price history for one stock with offset/length pagination.
    ///
    /// Bounds on `skip`/`limit` are enforced by the API layer; this simply
    /// slices. `total` is the count before pagination.
    pub fn stock_prices(&self, name: &str, skip: usize, limit: usize) -> Result<StockPriceList> {
        let rows = self.loader.stock_data(name)?;
        let total = rows.len();
        debug!("{} rows for {}, returning [{}..{}+{}]", total, name, skip, skip, limit);

        let data = rows.into_iter().skip(skip).take(limit).collect();
        Ok(StockPriceList { data, total })
    }

    /// Price record for an exact calendar date, if any.
    pub fn price_at_date(&self, name: &str, date: NaiveDate) -> Result<Option<StockPriceRecord>> {
        self.loader.price_at_date(name, date)
    }

    /// Cumulative return between two dates (inclusive).
    pub fn calculate_returns(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<CumulativeReturn> {
        self.loader.cumulative_return(name, start_date, end_date)
    }
}
