//! Runtime configuration
//!
//! Defaults mirror the public endpoints; `COINVIEW_API_URL` and
//! `COINVIEW_WS_URL` override the bases, everything else is set through the
//! builder methods.

use std::time::Duration;

use crate::engine::ReconcileParams;

/// Top-level configuration for the market overview terminal.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the markets REST API
    pub api_base: String,
    /// Quote currency for the snapshot
    pub vs_currency: String,
    /// Coins per snapshot page
    pub snapshot_page_size: u32,
    /// Number of snapshot pages to fetch
    pub snapshot_pages: u32,
    /// Base URL of the trade stream WebSocket endpoint
    pub ws_base: String,
    /// How long a price flash stays lit after the most recent tick
    pub flash_ttl: Duration,
    /// Rows rendered beyond the viewport on each side
    pub overscan: usize,
    /// Derived-metric nudge parameters
    pub reconcile: ReconcileParams,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.coingecko.com/api/v3".to_string(),
            vs_currency: "usd".to_string(),
            snapshot_page_size: 250,
            snapshot_pages: 4,
            ws_base: "wss://stream.binance.com:9443".to_string(),
            flash_ttl: Duration::from_millis(1200),
            overscan: 10,
            reconcile: ReconcileParams::default(),
        }
    }
}

impl AppConfig {
    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(api_base) = std::env::var("COINVIEW_API_URL") {
            config.api_base = api_base;
        }
        if let Ok(ws_base) = std::env::var("COINVIEW_WS_URL") {
            config.ws_base = ws_base;
        }
        config
    }

    /// Set the flash expiry window.
    pub fn with_flash_ttl(mut self, ttl: Duration) -> Self {
        self.flash_ttl = ttl;
        self
    }

    /// Set the virtualization overscan margin.
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Set the snapshot page count and size.
    pub fn with_snapshot_pages(mut self, pages: u32, page_size: u32) -> Self {
        self.snapshot_pages = pages;
        self.snapshot_page_size = page_size;
        self
    }
}
