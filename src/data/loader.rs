//! CSV data loader
//!
//! Parses the source CSV into an in-memory table, validates required columns
//! and value constraints, and memoizes per-stock subsets. The table is loaded
//! lazily and rebuilt whenever the file's modification time advances.

use crate::data::model::{parse_asof, StockPriceRecord};
use crate::error::{AppError, Result};
use chrono::{NaiveDate, NaiveTime};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

const REQUIRED_COLUMNS: [&str; 7] = [
    "#",
    "name",
    "asof",
    "volume",
    "close_usd",
    "sector_level1",
    "sector_level2",
];

/// Result of a cumulative-return calculation over a date window.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeReturn {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cumulative_return: f64,
    pub start_price: f64,
    pub end_price: f64,
}

/// Mutable loader state.
///
/// Everything lives behind one lock so a reload and the cache repopulation
/// that follows are atomic from any reader's perspective. The unique-name
/// memo is invalidated together with the per-stock cache.
#[derive(Default)]
struct LoaderState {
    table: Option<Vec<StockPriceRecord>>,
    per_stock: HashMap<String, Vec<StockPriceRecord>>,
    unique_names: Option<Vec<String>>,
    last_modified: Option<SystemTime>,
}

/// Loads and caches stock price data from a CSV file.
///
/// The backing file path is fixed at construction. Constructed once at
/// startup and shared via `Arc`; all interior state is lock-guarded.
pub struct StockDataLoader {
    csv_path: PathBuf,
    state: Mutex<LoaderState>,
}

impl StockDataLoader {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            state: Mutex::new(LoaderState::default()),
        }
    }

    /// Return the full source table, parsing the CSV on first access.
    pub fn load(&self) -> Result<Vec<StockPriceRecord>> {
        let mut state = self.state.lock();
        Self::table(&self.csv_path, &mut state).map(|table| table.clone())
    }

    /// Check whether the backing file changed since the last check.
    ///
    /// The first call always reports modified and records the current mtime.
    pub fn is_file_modified(&self) -> Result<bool> {
        let mut state = self.state.lock();
        Self::check_modified(&self.csv_path, &mut state)
    }

    /// Deduplicated stock names in first-occurrence order. Memoized.
    pub fn unique_stocks(&self) -> Result<Vec<String>> {
        let mut state = self.state.lock();
        if let Some(ref names) = state.unique_names {
            return Ok(names.clone());
        }

        let names = {
            let table = Self::table(&self.csv_path, &mut state)?;
            let mut names: Vec<String> = Vec::new();
            for record in table {
                if !names.contains(&record.name) {
                    names.push(record.name.clone());
                }
            }
            names
        };
        state.unique_names = Some(names.clone());
        Ok(names)
    }

    /// All rows for one stock, in source order. Memoized per name.
    ///
    /// Runs the modification check first: if the file changed, every cache
    /// (table, per-stock subsets, unique names) is dropped before the lookup.
    /// An unknown name yields an empty subset, not an error.
    pub fn stock_data(&self, name: &str) -> Result<Vec<StockPriceRecord>> {
        let mut state = self.state.lock();

        if Self::check_modified(&self.csv_path, &mut state)? {
            debug!("Source file changed, invalidating caches");
            state.per_stock.clear();
            state.unique_names = None;
            state.table = None;
        }

        if !state.per_stock.contains_key(name) {
            let subset: Vec<StockPriceRecord> = {
                let table = Self::table(&self.csv_path, &mut state)?;
                table.iter().filter(|r| r.name == name).cloned().collect()
            };
            state.per_stock.insert(name.to_string(), subset);
        }

        Ok(state.per_stock.get(name).cloned().unwrap_or_default())
    }

    /// First row for `name` whose `asof` falls on the given calendar date.
    pub fn price_at_date(&self, name: &str, date: NaiveDate) -> Result<Option<StockPriceRecord>> {
        let rows = self.stock_data(name)?;
        Ok(rows.into_iter().find(|r| r.asof_date() == date))
    }

    /// Percentage price change over the closed window `[start_date, end_date]`.
    ///
    /// Endpoints are the chronologically first and last rows in the window
    /// (stable sort, so ties keep source order). Requires at least two rows
    /// and a non-zero starting price.
    pub fn cumulative_return(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<CumulativeReturn> {
        let rows = self.stock_data(name)?;

        let start_ts = start_date.and_time(NaiveTime::MIN);
        let end_ts = end_date.and_time(NaiveTime::MIN);
        let mut window: Vec<&StockPriceRecord> = rows
            .iter()
            .filter(|r| r.asof >= start_ts && r.asof <= end_ts)
            .collect();

        if window.len() < 2 {
            return Err(AppError::InsufficientData(
                "Insufficient data points for calculation".to_string(),
            ));
        }

        window.sort_by_key(|r| r.asof);
        let (first, last) = (window[0], window[window.len() - 1]);

        if first.close_usd == 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Start price for {} on {} is zero, return is undefined",
                name,
                first.asof_date()
            )));
        }

        let pct = (last.close_usd - first.close_usd) / first.close_usd * 100.0;

        Ok(CumulativeReturn {
            name: name.to_string(),
            start_date,
            end_date,
            cumulative_return: round2(pct),
            start_price: first.close_usd,
            end_price: last.close_usd,
        })
    }

    fn table<'a>(path: &Path, state: &'a mut LoaderState) -> Result<&'a Vec<StockPriceRecord>> {
        match state.table {
            Some(ref table) => Ok(table),
            None => {
                let table = load_table(path)?;
                debug!("Loaded {} rows from {}", table.len(), path.display());
                Ok(state.table.insert(table))
            }
        }
    }

    fn check_modified(path: &Path, state: &mut LoaderState) -> Result<bool> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::FileNotFound(path.display().to_string())
            } else {
                AppError::Io(e)
            }
        })?;
        let mtime = metadata.modified()?;

        match state.last_modified {
            Some(seen) if mtime <= seen => Ok(false),
            _ => {
                state.last_modified = Some(mtime);
                Ok(true)
            }
        }
    }
}

/// Parse and validate the CSV file.
///
/// Fails when a required column is absent, a `name` is empty, an `asof` value
/// does not parse, a `#` value is not a positive integer, or any numeric
/// `volume`/`close_usd` is negative. Rows whose `volume` or `close_usd` fail
/// numeric coercion are dropped with a warning, not an error.
fn load_table(path: &Path) -> Result<Vec<StockPriceRecord>> {
    if !path.exists() {
        return Err(AppError::FileNotFound(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut column_index: HashMap<&str, usize> = HashMap::new();
    for (i, header) in headers.iter().enumerate() {
        column_index.entry(header.trim()).or_insert(i);
    }
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !column_index.contains_key(c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required columns: {missing:?}"
        )));
    }

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in reader.records() {
        let row = row?;
        let field = |col: &str| row.get(column_index[col]).unwrap_or("").trim();

        let name = field("name");
        if name.is_empty() {
            return Err(AppError::Validation("Found missing stock names".to_string()));
        }

        let asof_raw = field("asof");
        let asof = parse_asof(asof_raw).ok_or_else(|| {
            AppError::Validation(format!("Invalid asof date: {asof_raw:?}"))
        })?;

        let sequence_id: i64 = field("#").parse().map_err(|_| {
            AppError::Validation(format!("Invalid row id: {:?}", field("#")))
        })?;
        if sequence_id < 1 {
            return Err(AppError::Validation(format!(
                "Invalid row id: {sequence_id}"
            )));
        }

        // Negative values in a column that did parse are a data error; values
        // that fail coercion altogether only drop the row.
        let volume: Option<i64> = field("volume").parse().ok();
        let close_usd: Option<f64> = field("close_usd").parse().ok();

        if matches!(volume, Some(v) if v < 0) {
            return Err(AppError::Validation("Found negative volume values".to_string()));
        }
        if matches!(close_usd, Some(c) if c < 0.0) {
            return Err(AppError::Validation("Found negative price values".to_string()));
        }

        let (Some(volume), Some(close_usd)) = (volume, close_usd) else {
            dropped += 1;
            continue;
        };

        records.push(StockPriceRecord {
            sequence_id,
            name: name.to_string(),
            asof,
            volume,
            close_usd,
            sector_level1: field("sector_level1").to_string(),
            sector_level2: field("sector_level2").to_string(),
        });
    }

    if dropped > 0 {
        warn!("Dropping {} rows with invalid numeric values", dropped);
    }

    Ok(records)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
