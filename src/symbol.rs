//! Mapping from feed-native stream symbols to canonical coin ids
//!
//! The trade feed names instruments by concatenated pair ("BTCUSDT") while the
//! snapshot API names them by listing id ("bitcoin"). The resolver bridges the
//! two for the fixed set of pairs we subscribe to; anything else is ignored.

use std::collections::HashMap;

/// Pairs we subscribe to, and the snapshot id each one maps to.
const TRACKED: [(&str, &str); 6] = [
    ("btcusdt", "bitcoin"),
    ("ethusdt", "ethereum"),
    ("bnbusdt", "binancecoin"),
    ("xrpusdt", "ripple"),
    ("adausdt", "cardano"),
    ("solusdt", "solana"),
];

/// Resolves feed symbols to canonical coin ids.
///
/// Lookup is case-insensitive on the feed symbol. Symbols outside the tracked
/// set resolve to `None`; callers drop those ticks silently because the feed
/// legitimately broadcasts streams we do not display.
#[derive(Debug, Clone)]
pub struct SymbolResolver {
    by_symbol: HashMap<&'static str, &'static str>,
}

impl SymbolResolver {
    pub fn new() -> Self {
        Self {
            by_symbol: TRACKED.iter().copied().collect(),
        }
    }

    /// Resolve a feed symbol (any case) to its canonical coin id.
    pub fn resolve(&self, feed_symbol: &str) -> Option<&'static str> {
        let lower = feed_symbol.to_ascii_lowercase();
        self.by_symbol.get(lower.as_str()).copied()
    }

    /// Lower-case feed symbols in subscription order, for building stream URLs.
    pub fn feed_symbols(&self) -> impl Iterator<Item = &'static str> {
        TRACKED.iter().map(|(symbol, _)| *symbol)
    }
}

impl Default for SymbolResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_tracked_symbols() {
        let resolver = SymbolResolver::new();
        assert_eq!(resolver.resolve("btcusdt"), Some("bitcoin"));
        assert_eq!(resolver.resolve("solusdt"), Some("solana"));
    }

    #[test]
    fn test_case_insensitive() {
        let resolver = SymbolResolver::new();
        assert_eq!(resolver.resolve("BTCUSDT"), Some("bitcoin"));
        assert_eq!(resolver.resolve("EthUsdt"), Some("ethereum"));
    }

    #[test]
    fn test_unknown_symbol_is_none() {
        let resolver = SymbolResolver::new();
        assert_eq!(resolver.resolve("dogeusdt"), None);
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn test_resolve_is_pure() {
        let resolver = SymbolResolver::new();
        for _ in 0..3 {
            assert_eq!(resolver.resolve("xrpusdt"), Some("ripple"));
            assert_eq!(resolver.resolve("shibusdt"), None);
        }
    }

    #[test]
    fn test_feed_symbols_cover_tracked_set() {
        let resolver = SymbolResolver::new();
        let symbols: Vec<_> = resolver.feed_symbols().collect();
        assert_eq!(symbols.len(), 6);
        assert!(symbols.contains(&"btcusdt"));
        for symbol in symbols {
            assert!(resolver.resolve(symbol).is_some());
        }
    }
}
