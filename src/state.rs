//! Application state shared across handlers

use crate::config::Config;
use crate::data::StockDataLoader;
use crate::services::StockService;
use std::path::PathBuf;
use std::sync::Arc;

/// State handed to every request handler.
///
/// The loader is constructed once here and injected into the service; tests
/// build an `AppState` around a fixture CSV for an isolated instance.
pub struct AppState {
    pub stocks: StockService,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_csv_path(config.csv_path.clone())
    }

    pub fn with_csv_path(csv_path: impl Into<PathBuf>) -> Self {
        let loader = Arc::new(StockDataLoader::new(csv_path));
        Self {
            stocks: StockService::new(loader),
        }
    }
}
