//! FILENAME: core/pivot-grid/src/paginate.rs
//! Pagination over the row axis.
//!
//! Spans measured over the whole axis are wrong once a page cuts a group,
//! so the visible rows get their spans recomputed from what is actually on
//! the page. Page numbers are 1-based and clamped the way the page picker
//! expects.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::definition::PageWindow;
use crate::error::{PivotError, Result};
use crate::layout::{RenderableRow, RowLayout};

// ============================================================================
// PAGE ARITHMETIC
// ============================================================================

/// Page position over a row axis of `total_rows` data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_rows: usize,
    pub page_size: usize,
    /// 1-based, always within `1..=total_pages`.
    pub current_page: usize,
    /// At least 1, even for an empty axis.
    pub total_pages: usize,
}

impl Pagination {
    pub fn new(total_rows: usize, page_size: usize, requested_page: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(PivotError::InvalidPageSize);
        }
        let total_pages = total_rows.div_ceil(page_size).max(1);
        Ok(Pagination {
            total_rows,
            page_size,
            current_page: requested_page.clamp(1, total_pages),
            total_pages,
        })
    }

    /// Data rows `[start, end)` on the current page.
    pub fn window(&self) -> PageWindow {
        let start = self.current_page.saturating_sub(1) * self.page_size;
        let end = (start + self.page_size).min(self.total_rows);
        PageWindow {
            start: start.min(end),
            end,
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn next(&self) -> Self {
        Pagination {
            current_page: (self.current_page + 1).min(self.total_pages),
            ..*self
        }
    }

    pub fn prev(&self) -> Self {
        Pagination {
            current_page: self.current_page.saturating_sub(1).max(1),
            ..*self
        }
    }

    /// True when the axis does not fit on one page.
    pub fn is_paged(&self) -> bool {
        self.total_rows > self.page_size
    }
}

// ============================================================================
// RE-SPANNER
// ============================================================================

/// A row on the current page with spans valid for the page alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleRow {
    pub row: RenderableRow,
    /// Per row level: rows covered by a header cell anchored here, 0 where
    /// no cell starts on this row.
    pub spans: Vec<usize>,
}

/// Selects the rows of `layout` that belong on `window` and respans them.
///
/// Data rows are kept when their index is inside the window; subtotal rows
/// when at least one kept data row falls in their group. Order is preserved.
pub fn paginate(layout: &RowLayout, window: PageWindow) -> Vec<VisibleRow> {
    let visible_paths: Vec<&[String]> = layout
        .rows
        .iter()
        .filter_map(|row| match row {
            RenderableRow::Data { index, path, .. } if window.contains(*index) => {
                Some(path.segments())
            }
            _ => None,
        })
        .collect();

    let selected: Vec<&RenderableRow> = layout
        .rows
        .iter()
        .filter(|row| match row {
            RenderableRow::Data { index, .. } => window.contains(*index),
            RenderableRow::Subtotal { path, .. } => visible_paths
                .iter()
                .any(|p| p.starts_with(path.segments())),
        })
        .collect();

    let spans = respan(&selected, layout.levels);

    trace!(
        target: "pivot",
        "page [{}, {}): {} of {} rows visible",
        window.start,
        window.end,
        selected.len(),
        layout.rows.len()
    );

    selected
        .into_iter()
        .zip(spans)
        .map(|(row, spans)| VisibleRow {
            row: row.clone(),
            spans,
        })
        .collect()
}

/// Recomputes row-header spans over `rows` only.
///
/// Per level, a run starts at a data row whose key prefix through that
/// level differs from the current run. A subtotal deeper than the level is
/// absorbed into the run, one at the level closes the run after being
/// counted, and a shallower one closes it without being counted.
pub fn respan(rows: &[&RenderableRow], levels: usize) -> Vec<Vec<usize>> {
    let mut spans = vec![vec![0usize; levels]; rows.len()];

    for level in 0..levels {
        // (anchor row, group prefix, run length)
        let mut run: Option<(usize, &[String], usize)> = None;

        for (i, row) in rows.iter().enumerate() {
            match row {
                RenderableRow::Data { path, .. } => {
                    let prefix = path.prefix(level + 1);
                    let same_group = matches!(run, Some((_, group, _)) if group == prefix);
                    if same_group {
                        if let Some((_, _, len)) = run.as_mut() {
                            *len += 1;
                        }
                    } else {
                        close_run(&mut spans, level, run.take());
                        run = Some((i, prefix, 1));
                    }
                }
                RenderableRow::Subtotal { level: sub_level, .. } => {
                    if *sub_level > level {
                        if let Some((_, _, len)) = run.as_mut() {
                            *len += 1;
                        }
                    } else {
                        if *sub_level == level {
                            if let Some((_, _, len)) = run.as_mut() {
                                *len += 1;
                            }
                        }
                        close_run(&mut spans, level, run.take());
                    }
                }
            }
        }
        close_run(&mut spans, level, run.take());
    }

    spans
}

fn close_run(spans: &mut [Vec<usize>], level: usize, run: Option<(usize, &[String], usize)>) {
    if let Some((anchor, _, len)) = run {
        spans[anchor][level] = len;
    }
}
