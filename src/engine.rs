//! Reconciliation of live ticks against snapshot rows
//!
//! The feed carries only a trade price, not refreshed per-window change
//! figures, so the engine nudges the stored figures in the direction of each
//! price move instead of recomputing them from a true baseline. The nudges
//! are jittered and sign-consistent with the delta; they are a displayed
//! approximation for liveliness, never a ground-truth percentage.

use rand::Rng;

use crate::flash::FlashDirection;
use crate::store::CoinRow;

/// Tunable parameters for the per-tick reconciliation.
///
/// Weights decrease with window length: a single trade should move the 1h
/// figure visibly more than the 7d figure.
#[derive(Debug, Clone)]
pub struct ReconcileParams {
    /// Multiplicative jitter bounds applied to every nudge
    pub jitter_min: f64,
    pub jitter_max: f64,
    /// Per-tick nudge weight for each change window
    pub weight_1h: f64,
    pub weight_24h: f64,
    pub weight_7d: f64,
    /// Scale factor from absolute price delta to accumulated volume
    pub volume_unit_scale: f64,
}

impl Default for ReconcileParams {
    fn default() -> Self {
        Self {
            jitter_min: 0.9,
            jitter_max: 1.1,
            weight_1h: 0.04,
            weight_24h: 0.02,
            weight_7d: 0.01,
            volume_unit_scale: 12_000.0,
        }
    }
}

/// Applies one accepted tick to one row.
#[derive(Debug, Clone)]
pub struct Reconciler {
    params: ReconcileParams,
}

impl Reconciler {
    pub fn new(params: ReconcileParams) -> Self {
        Self { params }
    }

    /// Merge a tick price into `row`.
    ///
    /// Returns the flash direction the caller should schedule, or `None` when
    /// the tick changed nothing (duplicate price, or a non-positive/non-finite
    /// price the feed should never have produced). All row fields are written
    /// before this returns, so the renderer never observes a half-applied
    /// tick.
    pub fn apply(&self, row: &mut CoinRow, tick_price: f64) -> Option<FlashDirection> {
        if !tick_price.is_finite() || tick_price <= 0.0 {
            return None;
        }

        let delta = tick_price - row.price;
        if delta == 0.0 {
            return None;
        }

        let jitter = rand::rng().random_range(self.params.jitter_min..=self.params.jitter_max);
        let sign = if delta > 0.0 { 1.0 } else { -1.0 };

        row.price = tick_price;
        row.change_1h += sign * self.params.weight_1h * jitter;
        row.change_24h += sign * self.params.weight_24h * jitter;
        row.change_7d += sign * self.params.weight_7d * jitter;
        row.volume_24h += delta.abs() * self.params.volume_unit_scale * jitter;

        Some(if delta > 0.0 {
            FlashDirection::Rising
        } else {
            FlashDirection::Falling
        })
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(price: f64) -> CoinRow {
        CoinRow {
            id: "bitcoin".to_string(),
            rank: 1,
            name: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            price,
            change_1h: 1.0,
            change_24h: 2.0,
            change_7d: 3.0,
            market_cap: 1e12,
            volume_24h: 1000.0,
            circulating_supply: 1.96e7,
            history: vec![price; 8],
            flash: None,
        }
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let engine = Reconciler::default();
        let mut row = row(50000.0);
        let before = row.clone();

        assert_eq!(engine.apply(&mut row, 50000.0), None);
        assert_eq!(row.price, before.price);
        assert_eq!(row.change_1h, before.change_1h);
        assert_eq!(row.change_24h, before.change_24h);
        assert_eq!(row.change_7d, before.change_7d);
        assert_eq!(row.volume_24h, before.volume_24h);
    }

    #[test]
    fn test_rising_tick() {
        let engine = Reconciler::default();
        let mut row = row(50000.0);

        let direction = engine.apply(&mut row, 50100.0);
        assert_eq!(direction, Some(FlashDirection::Rising));
        assert_eq!(row.price, 50100.0);

        // Nudges are jittered but bounded and sign-consistent.
        let nudge_1h = row.change_1h - 1.0;
        assert!((0.04 * 0.9..=0.04 * 1.1).contains(&nudge_1h));
        let nudge_24h = row.change_24h - 2.0;
        assert!((0.02 * 0.9..=0.02 * 1.1).contains(&nudge_24h));
        let nudge_7d = row.change_7d - 3.0;
        assert!((0.01 * 0.9..=0.01 * 1.1).contains(&nudge_7d));

        let volume_gain = row.volume_24h - 1000.0;
        assert!((100.0 * 12_000.0 * 0.9..=100.0 * 12_000.0 * 1.1).contains(&volume_gain));
    }

    #[test]
    fn test_falling_tick() {
        let engine = Reconciler::default();
        let mut row = row(50000.0);

        let direction = engine.apply(&mut row, 49900.0);
        assert_eq!(direction, Some(FlashDirection::Falling));
        assert_eq!(row.price, 49900.0);
        assert!(row.change_1h < 1.0);
        assert!(row.change_24h < 2.0);
        assert!(row.change_7d < 3.0);
        // Volume grows on moves in either direction.
        assert!(row.volume_24h > 1000.0);
    }

    #[test]
    fn test_shorter_windows_move_more() {
        let engine = Reconciler::default();
        let mut row = row(100.0);
        engine.apply(&mut row, 101.0).unwrap();

        let nudge_1h = row.change_1h - 1.0;
        let nudge_24h = row.change_24h - 2.0;
        let nudge_7d = row.change_7d - 3.0;
        assert!(nudge_1h > nudge_24h);
        assert!(nudge_24h > nudge_7d);
    }

    #[test]
    fn test_history_untouched() {
        let engine = Reconciler::default();
        let mut row = row(50000.0);
        let history = row.history.clone();

        engine.apply(&mut row, 50100.0).unwrap();
        assert_eq!(row.history, history);
    }

    #[test]
    fn test_rejects_bad_prices() {
        let engine = Reconciler::default();
        let mut row = row(50000.0);
        let before = row.clone();

        assert_eq!(engine.apply(&mut row, 0.0), None);
        assert_eq!(engine.apply(&mut row, -5.0), None);
        assert_eq!(engine.apply(&mut row, f64::NAN), None);
        assert_eq!(row.price, before.price);
        assert_eq!(row.volume_24h, before.volume_24h);
    }

    #[test]
    fn test_volume_is_non_decreasing() {
        let engine = Reconciler::default();
        let mut row = row(100.0);
        let mut last_volume = row.volume_24h;

        for price in [101.0, 99.5, 99.5, 102.0, 98.0] {
            engine.apply(&mut row, price);
            assert!(row.volume_24h >= last_volume);
            last_volume = row.volume_24h;
        }
    }
}
