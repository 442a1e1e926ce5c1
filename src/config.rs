//! Environment-driven configuration

use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:4173,\
                                    http://127.0.0.1:5173,http://127.0.0.1:4173";

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the source CSV file.
    pub csv_path: PathBuf,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let csv_path = std::env::var("STOCKLENS_CSV_PATH")
            .unwrap_or_else(|_| "stock-data.csv".to_string())
            .into();

        let raw_addr =
            std::env::var("STOCKLENS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {raw_addr:?}: {e}"))?;

        let cors_origins = std::env::var("STOCKLENS_CORS_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            csv_path,
            bind_addr,
            cors_origins,
        })
    }
}
