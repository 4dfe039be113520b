//! Ratatui rendering of the virtualized market table
//!
//! Only the rows the [`super::window`] plan names are turned into widgets.
//! Scrollable cells are drawn first, then the pinned strip is cleared and the
//! pinned cells drawn on top, so horizontally scrolled content can never
//! occlude them.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{
        Block, BorderType, Borders, Clear, Gauge, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Sparkline,
    },
};

use crate::flash::FlashDirection;
use crate::store::{CoinRow, EntityStore};

use super::columns::{
    CellBody, CellValue, Column, PINNED_COLUMNS, pinned_offsets, pinned_width, scrollable_width,
};
use super::window;

const C_UP: Color = Color::Rgb(0, 255, 127);
const C_DOWN: Color = Color::Rgb(255, 69, 58);
const C_DIM: Color = Color::Rgb(128, 128, 150);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_HEADER: Color = Color::Rgb(100, 149, 237);
const C_GAUGE: Color = Color::Rgb(59, 130, 246);

/// Each row occupies one terminal line.
pub const ROW_HEIGHT: u32 = 1;

/// Scroll state for the table, in lines (vertical) and cells (horizontal).
#[derive(Debug, Clone)]
pub struct TableView {
    pub scroll: u32,
    pub h_scroll: u16,
    pub overscan: usize,
    /// Body height observed at the last render; drives paging
    pub viewport: u32,
    /// Table width observed at the last render; drives horizontal clamping
    pub table_width: u16,
}

impl TableView {
    pub fn new(overscan: usize) -> Self {
        Self {
            scroll: 0,
            h_scroll: 0,
            overscan,
            viewport: 0,
            table_width: 0,
        }
    }

    pub fn scroll_up(&mut self, lines: u32) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u32, total_rows: usize) {
        let max = window::max_scroll(total_rows, ROW_HEIGHT, self.viewport);
        self.scroll = self.scroll.saturating_add(lines).min(max);
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport.max(1));
    }

    pub fn page_down(&mut self, total_rows: usize) {
        self.scroll_down(self.viewport.max(1), total_rows);
    }

    pub fn home(&mut self) {
        self.scroll = 0;
    }

    pub fn end(&mut self, total_rows: usize) {
        self.scroll = window::max_scroll(total_rows, ROW_HEIGHT, self.viewport);
    }

    pub fn scroll_left(&mut self, cells: u16) {
        self.h_scroll = self.h_scroll.saturating_sub(cells);
    }

    pub fn scroll_right(&mut self, cells: u16, columns: &[Column]) {
        let visible = self.table_width.saturating_sub(pinned_width(columns));
        let max = scrollable_width(columns).saturating_sub(visible);
        self.h_scroll = self.h_scroll.saturating_add(cells).min(max);
    }
}

/// Render the market table into `area`, materializing only the planned window.
pub fn render_market_table(
    f: &mut Frame,
    area: Rect,
    store: &EntityStore,
    view: &mut TableView,
    columns: &[Column],
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(C_HEADER))
        .title(format!(" LIVE MARKET OVERVIEW ({}) ", store.len()));

    let inner = block.inner(area);
    f.render_widget(block, area);

    if store.is_empty() {
        let placeholder = Paragraph::new("Could not fetch coins, nothing to show yet")
            .style(Style::default().fg(C_DIM).add_modifier(Modifier::ITALIC))
            .alignment(ratatui::layout::Alignment::Center);
        f.render_widget(placeholder, inner);
        return;
    }
    if inner.height < 2 || inner.width == 0 {
        return;
    }

    let header_area = Rect { height: 1, ..inner };
    let body = Rect {
        y: inner.y + 1,
        height: inner.height - 1,
        ..inner
    };

    view.viewport = body.height as u32;
    view.table_width = inner.width;
    let total_rows = store.len();
    view.scroll = view
        .scroll
        .min(window::max_scroll(total_rows, ROW_HEIGHT, view.viewport));

    draw_header(f, header_area, view, columns);

    let plan = window::plan(
        view.scroll,
        view.viewport,
        ROW_HEIGHT,
        total_rows,
        view.overscan,
    );

    for index in plan.first..plan.end {
        let virtual_y = index as i64 * ROW_HEIGHT as i64 - view.scroll as i64;
        // Overscan rows sit outside the viewport; skip what the screen clips
        if virtual_y < 0 || virtual_y >= body.height as i64 {
            continue;
        }
        let y = body.y + virtual_y as u16;
        draw_row(f, body, y, &store.all()[index], view, columns);
    }

    let mut scrollbar_state = ScrollbarState::new(
        window::max_scroll(total_rows, ROW_HEIGHT, view.viewport) as usize,
    )
    .position(view.scroll as usize);
    f.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        body,
        &mut scrollbar_state,
    );
}

fn draw_header(f: &mut Frame, area: Rect, view: &TableView, columns: &[Column]) {
    let header_style = Style::default().fg(C_HEADER).add_modifier(Modifier::BOLD);
    let pinned_w = pinned_width(columns).min(area.width);

    // Scrollable headers first, pinned on top
    let mut x = 0u16;
    for column in columns.iter().skip(PINNED_COLUMNS) {
        if let Some(rect) = scrollable_cell_rect(area, area.y, pinned_w, x, column.width, view) {
            f.render_widget(
                Paragraph::new(column.header)
                    .alignment(column.align)
                    .style(header_style),
                rect,
            );
        }
        x += column.width;
    }

    clear_pinned_strip(f, area, area.y, pinned_w);
    for (column, offset) in columns
        .iter()
        .take(PINNED_COLUMNS)
        .zip(pinned_offsets(columns))
    {
        if let Some(rect) = pinned_cell_rect(area, area.y, offset, column.width) {
            f.render_widget(
                Paragraph::new(column.header)
                    .alignment(column.align)
                    .style(header_style),
                rect,
            );
        }
    }
}

fn draw_row(f: &mut Frame, body: Rect, y: u16, row: &CoinRow, view: &TableView, columns: &[Column]) {
    let pinned_w = pinned_width(columns).min(body.width);

    let mut x = 0u16;
    for column in columns.iter().skip(PINNED_COLUMNS) {
        if let Some(rect) = scrollable_cell_rect(body, y, pinned_w, x, column.width, view) {
            draw_cell(f, rect, column, &(column.render)(row), row.flash);
        }
        x += column.width;
    }

    clear_pinned_strip(f, body, y, pinned_w);
    for (column, offset) in columns
        .iter()
        .take(PINNED_COLUMNS)
        .zip(pinned_offsets(columns))
    {
        if let Some(rect) = pinned_cell_rect(body, y, offset, column.width) {
            draw_cell(f, rect, column, &(column.render)(row), row.flash);
        }
    }
}

/// Screen rect for a scrollable cell, or `None` when it is scrolled out.
fn scrollable_cell_rect(
    area: Rect,
    y: u16,
    pinned_w: u16,
    column_x: u16,
    width: u16,
    view: &TableView,
) -> Option<Rect> {
    let x = area.x as i64 + pinned_w as i64 + column_x as i64 - view.h_scroll as i64;
    let right_edge = (area.x + area.width) as i64;
    if x < area.x as i64 || x >= right_edge {
        return None;
    }
    let width = (width as i64).min(right_edge - x) as u16;
    if width == 0 {
        return None;
    }
    Some(Rect {
        x: x as u16,
        y,
        width,
        height: 1,
    })
}

fn pinned_cell_rect(area: Rect, y: u16, offset: u16, width: u16) -> Option<Rect> {
    if offset >= area.width {
        return None;
    }
    Some(Rect {
        x: area.x + offset,
        y,
        width: width.min(area.width - offset),
        height: 1,
    })
}

/// Blank the pinned strip so scrolled content cannot bleed through under the
/// pinned cells drawn after it.
fn clear_pinned_strip(f: &mut Frame, area: Rect, y: u16, pinned_w: u16) {
    if pinned_w == 0 {
        return;
    }
    f.render_widget(
        Clear,
        Rect {
            x: area.x,
            y,
            width: pinned_w,
            height: 1,
        },
    );
}

fn draw_cell(
    f: &mut Frame,
    rect: Rect,
    column: &Column,
    value: &CellValue,
    flash: Option<FlashDirection>,
) {
    match &value.body {
        CellBody::Text(text) => {
            f.render_widget(
                Paragraph::new(text.as_str())
                    .alignment(column.align)
                    .style(Style::default().fg(cell_color(value, flash))),
                rect,
            );
        }
        CellBody::Spark(points) => {
            if points.is_empty() {
                return;
            }
            f.render_widget(
                Sparkline::default()
                    .data(points)
                    .style(Style::default().fg(cell_color(value, flash))),
                rect,
            );
        }
        CellBody::Gauge { label, ratio } => {
            f.render_widget(
                Gauge::default()
                    .ratio(ratio.clamp(0.0, 1.0))
                    .label(label.as_str())
                    .gauge_style(Style::default().fg(C_GAUGE).bg(Color::Rgb(30, 30, 40)))
                    .use_unicode(true),
                rect,
            );
        }
    }
}

/// Flash tint wins over sign coloring; plain cells stay bright.
fn cell_color(value: &CellValue, flash: Option<FlashDirection>) -> Color {
    if value.flash_aware {
        match flash {
            Some(FlashDirection::Rising) => return C_UP,
            Some(FlashDirection::Falling) => return C_DOWN,
            None => {}
        }
    }
    match value.signed {
        Some(v) if v < 0.0 => C_DOWN,
        Some(_) => C_UP,
        None => C_BRIGHT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::columns::market_columns;

    fn columns() -> Vec<Column> {
        market_columns()
    }

    #[test]
    fn test_view_vertical_clamping() {
        let mut view = TableView::new(10);
        view.viewport = 20;

        view.scroll_down(5, 100);
        assert_eq!(view.scroll, 5);
        view.end(100);
        assert_eq!(view.scroll, 80);
        view.scroll_down(50, 100);
        assert_eq!(view.scroll, 80);
        view.home();
        view.scroll_up(10);
        assert_eq!(view.scroll, 0);
    }

    #[test]
    fn test_view_paging() {
        let mut view = TableView::new(10);
        view.viewport = 25;
        view.page_down(1000);
        assert_eq!(view.scroll, 25);
        view.page_up();
        assert_eq!(view.scroll, 0);
    }

    #[test]
    fn test_view_horizontal_clamping() {
        let columns = columns();
        let mut view = TableView::new(10);
        view.table_width = 80;

        view.scroll_right(4, &columns);
        assert_eq!(view.h_scroll, 4);
        view.scroll_right(u16::MAX, &columns);
        let max = scrollable_width(&columns) - (80 - pinned_width(&columns));
        assert_eq!(view.h_scroll, max);
        view.scroll_left(u16::MAX);
        assert_eq!(view.h_scroll, 0);
    }

    #[test]
    fn test_scrollable_cell_rect_clipping() {
        let area = Rect::new(0, 0, 80, 30);
        let view = TableView {
            scroll: 0,
            h_scroll: 0,
            overscan: 10,
            viewport: 30,
            table_width: 80,
        };

        // In view
        let rect = scrollable_cell_rect(area, 5, 43, 0, 14, &view).unwrap();
        assert_eq!((rect.x, rect.width), (43, 14));

        // Scrolled fully off the left edge
        let scrolled = TableView {
            h_scroll: 60,
            ..view.clone()
        };
        assert!(scrollable_cell_rect(area, 5, 43, 0, 14, &scrolled).is_none());

        // Clipped at the right edge
        let rect = scrollable_cell_rect(area, 5, 43, 30, 14, &view).unwrap();
        assert_eq!(rect.width, 80 - rect.x);
    }

    #[test]
    fn test_pinned_cell_rect_never_moves() {
        let area = Rect::new(2, 0, 80, 30);
        let rect = pinned_cell_rect(area, 7, 5, 24).unwrap();
        assert_eq!((rect.x, rect.y, rect.width), (7, 7, 24));
        assert!(pinned_cell_rect(area, 7, 100, 24).is_none());
    }

    #[test]
    fn test_cell_color_precedence() {
        let flashed = CellValue {
            body: CellBody::Text("x".to_string()),
            flash_aware: true,
            signed: Some(-1.0),
        };
        assert_eq!(cell_color(&flashed, Some(FlashDirection::Rising)), C_UP);
        assert_eq!(cell_color(&flashed, Some(FlashDirection::Falling)), C_DOWN);
        // No flash active: fall back to sign coloring
        assert_eq!(cell_color(&flashed, None), C_DOWN);

        let plain = CellValue {
            body: CellBody::Text("x".to_string()),
            flash_aware: false,
            signed: None,
        };
        assert_eq!(cell_color(&plain, Some(FlashDirection::Rising)), C_BRIGHT);
    }
}
