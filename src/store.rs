//! Authoritative, ordered collection of market rows
//!
//! Rows are created once from the snapshot, then mutated in place by the
//! reconciliation engine and the flash scheduler. Ids are unique and stable;
//! ticks never add or remove rows.

use std::collections::HashMap;

use tracing::debug;

use crate::flash::FlashDirection;
use crate::snapshot::MarketSnapshot;

/// One row of the market table.
#[derive(Debug, Clone)]
pub struct CoinRow {
    /// Canonical listing id ("bitcoin"), unique and never reassigned
    pub id: String,
    /// Market-cap rank from the snapshot; not touched by ticks
    pub rank: u32,
    pub name: String,
    pub symbol: String,
    /// Last accepted trade price
    pub price: f64,
    /// Approximate per-window change figures, nudged per tick
    pub change_1h: f64,
    pub change_24h: f64,
    pub change_7d: f64,
    pub market_cap: f64,
    /// Session volume accumulator, non-decreasing
    pub volume_24h: f64,
    pub circulating_supply: f64,
    /// 7-day price samples frozen at snapshot time. Deliberately never updated
    /// by the live feed so the trend line stays a clean historical record.
    pub history: Vec<f64>,
    /// Transient flash state owned by the scheduler
    pub flash: Option<FlashDirection>,
}

impl From<MarketSnapshot> for CoinRow {
    fn from(snapshot: MarketSnapshot) -> Self {
        Self {
            id: snapshot.id,
            rank: snapshot.market_cap_rank.unwrap_or(0),
            name: snapshot.name,
            symbol: snapshot.symbol.to_ascii_uppercase(),
            price: snapshot.current_price.unwrap_or(0.0),
            change_1h: snapshot
                .price_change_percentage_1h_in_currency
                .unwrap_or(0.0),
            change_24h: snapshot
                .price_change_percentage_24h_in_currency
                .unwrap_or(0.0),
            change_7d: snapshot
                .price_change_percentage_7d_in_currency
                .unwrap_or(0.0),
            market_cap: snapshot.market_cap.unwrap_or(0.0),
            volume_24h: snapshot.total_volume.unwrap_or(0.0),
            circulating_supply: snapshot.circulating_supply.unwrap_or(0.0),
            history: snapshot
                .sparkline_in_7d
                .map(|samples| samples.price)
                .unwrap_or_default(),
            flash: None,
        }
    }
}

/// Ordered store of rows keyed by id.
///
/// `mutate` is the single path by which row state changes after creation;
/// observers only ever see a row after a mutation closure has run to
/// completion.
#[derive(Debug, Default)]
pub struct EntityStore {
    rows: Vec<CoinRow>,
    index: HashMap<String, usize>,
}

impl EntityStore {
    /// Build the store from the snapshot listing, keeping snapshot order.
    /// Duplicate ids keep the first occurrence.
    pub fn from_snapshot(snapshot: Vec<MarketSnapshot>) -> Self {
        let mut rows: Vec<CoinRow> = Vec::with_capacity(snapshot.len());
        let mut index = HashMap::with_capacity(snapshot.len());

        for record in snapshot {
            if index.contains_key(&record.id) {
                debug!("dropping duplicate snapshot id {}", record.id);
                continue;
            }
            index.insert(record.id.clone(), rows.len());
            rows.push(CoinRow::from(record));
        }

        Self { rows, index }
    }

    pub fn get(&self, id: &str) -> Option<&CoinRow> {
        self.index.get(id).map(|&position| &self.rows[position])
    }

    /// All rows in table order.
    pub fn all(&self) -> &[CoinRow] {
        &self.rows
    }

    /// Apply `mutation` to the row with `id`, returning the closure's result,
    /// or `None` when the id is not in the store.
    pub fn mutate<R>(&mut self, id: &str, mutation: impl FnOnce(&mut CoinRow) -> R) -> Option<R> {
        let position = *self.index.get(id)?;
        Some(mutation(&mut self.rows[position]))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SparklineSamples;

    fn snapshot_record(id: &str, rank: u32, price: f64) -> MarketSnapshot {
        MarketSnapshot {
            id: id.to_string(),
            symbol: id[..3.min(id.len())].to_string(),
            name: id.to_string(),
            market_cap_rank: Some(rank),
            current_price: Some(price),
            market_cap: Some(price * 1_000_000.0),
            circulating_supply: Some(1_000_000.0),
            total_volume: Some(500_000.0),
            price_change_percentage_1h_in_currency: Some(0.5),
            price_change_percentage_24h_in_currency: Some(-1.0),
            price_change_percentage_7d_in_currency: None,
            sparkline_in_7d: Some(SparklineSamples {
                price: vec![price * 0.98, price * 0.99, price],
            }),
        }
    }

    #[test]
    fn test_from_snapshot_preserves_order() {
        let store = EntityStore::from_snapshot(vec![
            snapshot_record("bitcoin", 1, 50000.0),
            snapshot_record("ethereum", 2, 3000.0),
            snapshot_record("solana", 3, 150.0),
        ]);

        assert_eq!(store.len(), 3);
        assert_eq!(store.all()[0].id, "bitcoin");
        assert_eq!(store.all()[2].id, "solana");
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let store = EntityStore::from_snapshot(vec![
            snapshot_record("bitcoin", 1, 50000.0),
            snapshot_record("bitcoin", 9, 1.0),
        ]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("bitcoin").unwrap().rank, 1);
    }

    #[test]
    fn test_null_fields_default() {
        let mut record = snapshot_record("newcoin", 5, 2.0);
        record.current_price = None;
        record.sparkline_in_7d = None;
        let store = EntityStore::from_snapshot(vec![record]);

        let row = store.get("newcoin").unwrap();
        assert_eq!(row.price, 0.0);
        assert_eq!(row.change_7d, 0.0);
        assert!(row.history.is_empty());
    }

    #[test]
    fn test_mutate_known_and_unknown() {
        let mut store = EntityStore::from_snapshot(vec![snapshot_record("bitcoin", 1, 50000.0)]);

        let result = store.mutate("bitcoin", |row| {
            row.price = 50100.0;
            row.price
        });
        assert_eq!(result, Some(50100.0));
        assert_eq!(store.get("bitcoin").unwrap().price, 50100.0);

        assert_eq!(store.mutate("dogecoin", |row| row.price = 1.0), None);
    }

    #[test]
    fn test_empty_store() {
        let store = EntityStore::from_snapshot(Vec::new());
        assert!(store.is_empty());
        assert!(store.get("bitcoin").is_none());
        assert!(store.all().is_empty());
    }
}
