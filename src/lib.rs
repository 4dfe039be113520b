/// Coinview - Live Market Overview Terminal
///
/// A ranked crypto market table in the terminal: seeded from a paginated REST
/// snapshot, revised in place by a live trade stream, with per-row price
/// flashes that expire on their own and a virtualized viewport that only
/// materializes the visible slice of the table.
///
/// The library is split along the data path:
/// - `snapshot`: typed REST listing that creates the rows
/// - `feed`: WebSocket trade stream, decode, reconnect, scoped shutdown
/// - `symbol`: feed symbol to canonical id resolution
/// - `engine`: per-tick reconciliation of price, derived changes, and volume
/// - `flash`: transient highlight state with collapsing expiry
/// - `store`: the ordered row collection everything above mutates
/// - `table`: column contract, window math, and ratatui rendering
/// - `app`: the event loop that owns all of it
pub mod app;
pub mod config;
pub mod engine;
pub mod feed;
pub mod flash;
pub mod snapshot;
pub mod store;
pub mod symbol;
pub mod table;

// Re-export commonly used types for convenience
pub use app::MarketState;
pub use config::AppConfig;
pub use engine::{ReconcileParams, Reconciler};
pub use feed::{ConnectionStatus, DecodeError, FeedConfig, FeedHandle, Tick};
pub use flash::{FlashDirection, FlashScheduler};
pub use snapshot::{MarketSnapshot, SnapshotError};
pub use store::{CoinRow, EntityStore};
pub use symbol::SymbolResolver;
pub use table::{Column, TableView, WindowPlan};
