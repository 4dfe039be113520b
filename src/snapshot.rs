//! Paginated REST snapshot of the ranked market
//!
//! Fetches the full coin listing (CoinGecko `/coins/markets` shape) that seeds
//! the entity store. The snapshot is the only source of row creation; the live
//! feed afterwards mutates rows in place and never adds new ones.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AppConfig;

/// One coin record as returned by the markets endpoint.
///
/// Numeric fields are nullable upstream (freshly listed coins often lack the
/// per-window change figures), so everything optional defaults on conversion.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketSnapshot {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap_rank: Option<u32>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_volume: Option<f64>,
    pub price_change_percentage_1h_in_currency: Option<f64>,
    pub price_change_percentage_24h_in_currency: Option<f64>,
    pub price_change_percentage_7d_in_currency: Option<f64>,
    pub sparkline_in_7d: Option<SparklineSamples>,
}

/// Fixed-length price sample sequence captured at snapshot time.
#[derive(Debug, Clone, Deserialize)]
pub struct SparklineSamples {
    pub price: Vec<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("snapshot endpoint returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Fetch the ranked market listing, page by page.
///
/// A failed page fails the whole fetch; the caller renders the empty state
/// rather than a partial table.
pub async fn fetch_markets(config: &AppConfig) -> Result<Vec<MarketSnapshot>, SnapshotError> {
    let client = reqwest::Client::new();
    let url = format!("{}/coins/markets", config.api_base.trim_end_matches('/'));
    let mut coins = Vec::new();

    for page in 1..=config.snapshot_pages {
        let response = client
            .get(&url)
            .query(&[
                ("vs_currency", config.vs_currency.as_str()),
                ("order", "market_cap_desc"),
                ("per_page", &config.snapshot_page_size.to_string()),
                ("page", &page.to_string()),
                ("sparkline", "true"),
                ("price_change_percentage", "1h,24h,7d"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("markets page {} returned {}", page, response.status());
            return Err(SnapshotError::Status(response.status()));
        }

        let page_coins: Vec<MarketSnapshot> = response.json().await?;
        debug!("fetched {} coins from page {}", page_coins.len(), page);

        let last_page = page_coins.len() < config.snapshot_page_size as usize;
        coins.extend(page_coins);
        if last_page {
            break;
        }
    }

    Ok(coins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_market_record() {
        let raw = r#"{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "market_cap_rank": 1,
            "current_price": 50000.0,
            "market_cap": 980000000000.0,
            "circulating_supply": 19600000.0,
            "total_volume": 32000000000.0,
            "price_change_percentage_1h_in_currency": 0.12,
            "price_change_percentage_24h_in_currency": -1.4,
            "price_change_percentage_7d_in_currency": 3.9,
            "sparkline_in_7d": { "price": [49000.0, 49500.0, 50000.0] }
        }"#;

        let snapshot: MarketSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.id, "bitcoin");
        assert_eq!(snapshot.market_cap_rank, Some(1));
        assert_eq!(snapshot.sparkline_in_7d.unwrap().price.len(), 3);
    }

    #[test]
    fn test_deserialize_tolerates_nulls() {
        let raw = r#"{
            "id": "newcoin",
            "symbol": "new",
            "name": "New Coin",
            "market_cap_rank": null,
            "current_price": null,
            "market_cap": null,
            "circulating_supply": null,
            "total_volume": null,
            "price_change_percentage_1h_in_currency": null,
            "price_change_percentage_24h_in_currency": null,
            "price_change_percentage_7d_in_currency": null,
            "sparkline_in_7d": null
        }"#;

        let snapshot: MarketSnapshot = serde_json::from_str(raw).unwrap();
        assert!(snapshot.current_price.is_none());
        assert!(snapshot.sparkline_in_7d.is_none());
    }
}
