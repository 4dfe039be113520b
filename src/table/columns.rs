//! Declarative column definitions for the market table
//!
//! Each column says what it renders and how wide it is; the widget decides
//! where cells land on screen. The three leading columns are pinned: they stay
//! put during horizontal scroll, stacked at offsets derived from their own
//! widths, and are drawn last so scrolling content never covers them.

use ratatui::layout::Alignment;

use crate::store::CoinRow;

/// Number of leading columns that stay fixed during horizontal scroll.
pub const PINNED_COLUMNS: usize = 3;

/// What a single cell wants drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum CellBody {
    Text(String),
    /// Scaled samples for a one-line sparkline
    Spark(Vec<u64>),
    /// Label plus fill ratio in [0, 1]
    Gauge { label: String, ratio: f64 },
}

/// Rendered cell content plus its color hints.
#[derive(Debug, Clone, PartialEq)]
pub struct CellValue {
    pub body: CellBody,
    /// Tint by the row's active flash, when one is lit
    pub flash_aware: bool,
    /// Color by sign (green positive, red negative) when no flash applies
    pub signed: Option<f64>,
}

impl CellValue {
    fn text(text: String) -> Self {
        Self {
            body: CellBody::Text(text),
            flash_aware: false,
            signed: None,
        }
    }
}

/// One column of the table.
pub struct Column {
    pub key: &'static str,
    pub header: &'static str,
    pub width: u16,
    pub align: Alignment,
    pub render: fn(&CoinRow) -> CellValue,
}

/// The market overview column set, pinned columns first.
pub fn market_columns() -> Vec<Column> {
    vec![
        Column {
            key: "rank",
            header: "#",
            width: 5,
            align: Alignment::Left,
            render: |row| CellValue::text(format!("{}", row.rank)),
        },
        Column {
            key: "name",
            header: "Name",
            width: 24,
            align: Alignment::Left,
            render: |row| CellValue::text(format!("{} {}", row.name, row.symbol)),
        },
        Column {
            key: "price",
            header: "Price",
            width: 14,
            align: Alignment::Right,
            render: |row| CellValue {
                body: CellBody::Text(format!("${}", format_price(row.price))),
                flash_aware: true,
                signed: None,
            },
        },
        Column {
            key: "change_1h",
            header: "1h%",
            width: 9,
            align: Alignment::Right,
            render: |row| CellValue {
                body: CellBody::Text(format!("{:+.2}%", row.change_1h)),
                flash_aware: true,
                signed: Some(row.change_1h),
            },
        },
        Column {
            key: "change_24h",
            header: "24h%",
            width: 9,
            align: Alignment::Right,
            render: |row| CellValue {
                body: CellBody::Text(format!("{:+.2}%", row.change_24h)),
                flash_aware: true,
                signed: Some(row.change_24h),
            },
        },
        Column {
            key: "change_7d",
            header: "7d%",
            width: 9,
            align: Alignment::Right,
            render: |row| CellValue {
                body: CellBody::Text(format!("{:+.2}%", row.change_7d)),
                flash_aware: true,
                signed: Some(row.change_7d),
            },
        },
        Column {
            key: "market_cap",
            header: "Market Cap",
            width: 14,
            align: Alignment::Right,
            render: |row| CellValue::text(format!("${}", format_large(row.market_cap))),
        },
        Column {
            key: "volume_24h",
            header: "Volume (24h)",
            width: 14,
            align: Alignment::Right,
            render: |row| CellValue {
                body: CellBody::Text(format!("${}", format_large(row.volume_24h))),
                flash_aware: true,
                signed: None,
            },
        },
        Column {
            key: "supply",
            header: "Circulating Supply",
            width: 20,
            align: Alignment::Left,
            render: |row| CellValue {
                body: CellBody::Gauge {
                    label: format!("{} {}", format_large(row.circulating_supply), row.symbol),
                    // Synthetic max supply at 1.2x circulating, so the fill
                    // ratio is a constant five-sixths
                    ratio: 1.0 / 1.2,
                },
                flash_aware: false,
                signed: None,
            },
        },
        Column {
            key: "last_7d",
            header: "Last 7 days",
            width: 22,
            align: Alignment::Left,
            render: |row| CellValue {
                body: CellBody::Spark(sparkline_points(&row.history)),
                flash_aware: true,
                signed: Some(row.change_7d),
            },
        },
    ]
}

/// Left offsets of the pinned columns, cumulative from their own widths.
pub fn pinned_offsets(columns: &[Column]) -> Vec<u16> {
    let mut offsets = Vec::with_capacity(PINNED_COLUMNS);
    let mut x = 0u16;
    for column in columns.iter().take(PINNED_COLUMNS) {
        offsets.push(x);
        x += column.width;
    }
    offsets
}

/// Combined width of the pinned region.
pub fn pinned_width(columns: &[Column]) -> u16 {
    columns
        .iter()
        .take(PINNED_COLUMNS)
        .map(|column| column.width)
        .sum()
}

/// Combined width of the scrollable region.
pub fn scrollable_width(columns: &[Column]) -> u16 {
    columns
        .iter()
        .skip(PINNED_COLUMNS)
        .map(|column| column.width)
        .sum()
}

/// Normalize raw price samples into sparkline buckets.
pub fn sparkline_points(history: &[f64]) -> Vec<u64> {
    let (min, max) = history.iter().fold((f64::MAX, f64::MIN), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    if history.is_empty() || max <= min {
        return vec![1; history.len()];
    }
    history
        .iter()
        .map(|&v| (((v - min) / (max - min)) * 100.0).round() as u64 + 1)
        .collect()
}

/// Format a price with precision that fits its magnitude.
pub fn format_price(price: f64) -> String {
    if price >= 1.0 {
        format!("{price:.2}")
    } else {
        format!("{price:.6}")
    }
}

/// Abbreviate a large value with a T/B/M/K suffix.
pub fn format_large(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_offsets_are_cumulative() {
        let columns = market_columns();
        let offsets = pinned_offsets(&columns);
        assert_eq!(offsets.len(), PINNED_COLUMNS);
        assert_eq!(offsets[0], 0);
        assert_eq!(offsets[1], columns[0].width);
        assert_eq!(offsets[2], columns[0].width + columns[1].width);
        assert_eq!(
            pinned_width(&columns),
            offsets[2] + columns[2].width
        );
    }

    #[test]
    fn test_column_set_shape() {
        let columns = market_columns();
        assert_eq!(columns.len(), 10);
        assert_eq!(columns[0].key, "rank");
        assert_eq!(columns[9].key, "last_7d");
        assert!(scrollable_width(&columns) > 0);
    }

    #[test]
    fn test_render_uses_row_values() {
        let columns = market_columns();
        let row = CoinRow {
            id: "bitcoin".to_string(),
            rank: 1,
            name: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            price: 50000.0,
            change_1h: 0.5,
            change_24h: -1.25,
            change_7d: 3.0,
            market_cap: 9.8e11,
            volume_24h: 3.2e10,
            circulating_supply: 1.96e7,
            history: vec![49000.0, 49500.0, 50000.0],
            flash: None,
        };

        let rendered = (columns[2].render)(&row);
        assert_eq!(rendered.body, CellBody::Text("$50000.00".to_string()));
        assert!(rendered.flash_aware);

        let change = (columns[4].render)(&row);
        assert_eq!(change.body, CellBody::Text("-1.25%".to_string()));
        assert_eq!(change.signed, Some(-1.25));
    }

    #[test]
    fn test_sparkline_points_scale() {
        let points = sparkline_points(&[1.0, 2.0, 3.0]);
        assert_eq!(points, vec![1, 51, 101]);
        assert_eq!(sparkline_points(&[]), Vec::<u64>::new());
        // Flat history still renders a visible line
        assert_eq!(sparkline_points(&[5.0, 5.0]), vec![1, 1]);
    }

    #[test]
    fn test_format_large() {
        assert_eq!(format_large(1.23e12), "1.23T");
        assert_eq!(format_large(9.8e11), "980.00B");
        assert_eq!(format_large(3.2e10), "32.00B");
        assert_eq!(format_large(1_500_000.0), "1.50M");
        assert_eq!(format_large(1_500.0), "1.50K");
        assert_eq!(format_large(12.3), "12.30");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(50000.0), "50000.00");
        assert_eq!(format_price(0.123456), "0.123456");
    }
}
