//! Virtualized market table: column contract, window math, and rendering.

pub mod columns;
pub mod widget;
pub mod window;

pub use columns::{market_columns, Column, PINNED_COLUMNS};
pub use widget::{render_market_table, TableView, ROW_HEIGHT};
pub use window::{plan, WindowPlan};
