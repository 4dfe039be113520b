//! Visible-row window computation for the virtualized table
//!
//! Given a scroll offset and viewport extent (both in terminal lines), pick
//! the contiguous row range worth materializing plus spacer extents that
//! account for everything off-screen. Row lookup is pure arithmetic, so the
//! cost per frame is bounded by the viewport, not the table length.

/// The slice of the table to materialize for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    /// First row index to render (inclusive)
    pub first: usize,
    /// One past the last row index to render
    pub end: usize,
    /// Extent of the rows above `first`, in lines
    pub padding_top: u32,
    /// Extent of the rows at and after `end`, in lines
    pub padding_bottom: u32,
}

impl WindowPlan {
    /// Number of rows this plan materializes.
    pub fn row_count(&self) -> usize {
        self.end - self.first
    }
}

/// Compute the window for the current scroll position.
///
/// `overscan` rows on each side are included beyond the strictly visible
/// range so fast scrolling does not flash blank lines. Degenerate inputs
/// (zero rows, zero row height, offset past the end) clamp rather than panic.
pub fn plan(
    scroll_offset: u32,
    viewport: u32,
    row_height: u32,
    total_rows: usize,
    overscan: usize,
) -> WindowPlan {
    let row_height = row_height.max(1);

    if total_rows == 0 {
        return WindowPlan {
            first: 0,
            end: 0,
            padding_top: 0,
            padding_bottom: 0,
        };
    }

    let first_visible = ((scroll_offset / row_height) as usize).min(total_rows - 1);
    let last_visible = (scroll_offset.saturating_add(viewport).saturating_add(row_height - 1)
        / row_height) as usize;

    let first = first_visible.saturating_sub(overscan);
    let end = last_visible.saturating_add(overscan).min(total_rows);
    let end = end.max(first);

    WindowPlan {
        first,
        end,
        padding_top: first as u32 * row_height,
        padding_bottom: (total_rows - end) as u32 * row_height,
    }
}

/// Total scrollable extent of the table, in lines.
pub fn total_height(total_rows: usize, row_height: u32) -> u32 {
    total_rows as u32 * row_height.max(1)
}

/// Largest useful scroll offset for the given viewport.
pub fn max_scroll(total_rows: usize, row_height: u32, viewport: u32) -> u32 {
    total_height(total_rows, row_height).saturating_sub(viewport)
}
