//! FILENAME: core/pivot-grid/src/view.rs
//! Pivot View - Renderable output for the frontend.
//!
//! Turns the visible rows of a page into per-row rendering instructions:
//! which row-header cells start on the row (with their spans), what they
//! read, and the values of the data columns. Cells covered by a span from
//! an earlier row are simply absent.

use serde::{Deserialize, Serialize};

use crate::cache::PivotResult;
use crate::definition::PivotLayout;
use crate::key::display_segment;
use crate::layout::{ColumnTotals, RenderableRow, RowLayout};
use crate::paginate::VisibleRow;

/// Types of rows in the pivot body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotRowType {
    Data,
    Subtotal,
    GrandTotal,
}

/// A row-header cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCell {
    /// Row-header column the cell starts in.
    pub level: usize,
    pub label: String,
    pub row_span: usize,
    pub col_span: usize,
}

/// Rendering instructions for one body row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRowView {
    pub row_type: PivotRowType,

    /// Row key index for data rows.
    pub data_index: Option<usize>,

    /// Level of the group a subtotal closes.
    pub subtotal_level: Option<usize>,

    /// Row-header cells starting on this row, left to right.
    pub labels: Vec<LabelCell>,

    /// One value per (column leaf, value slot), in header order.
    pub values: Vec<Option<f64>>,
}

/// Builds rendering instructions for the rows of one page.
pub fn render_rows(
    visible: &[VisibleRow],
    rows: &RowLayout,
    result: &PivotResult,
    layout: &PivotLayout,
) -> Vec<PivotRowView> {
    let levels = rows.levels;
    // Page row index up to which each row-header column is already taken.
    let mut covered_until = vec![0usize; levels];
    let mut out = Vec::with_capacity(visible.len());

    for (i, vrow) in visible.iter().enumerate() {
        let view = match &vrow.row {
            RenderableRow::Data { index, path, .. } => {
                let mut labels = Vec::new();
                for (level, &span) in vrow.spans.iter().enumerate().take(levels) {
                    if span == 0 {
                        continue;
                    }
                    covered_until[level] = i + span;
                    labels.push(LabelCell {
                        level,
                        label: display_segment(path.segment(level).unwrap_or(""), &layout.blank_label)
                            .to_string(),
                        row_span: span,
                        col_span: 1,
                    });
                }
                PivotRowView {
                    row_type: PivotRowType::Data,
                    data_index: Some(*index),
                    subtotal_level: None,
                    labels,
                    values: data_values(result, *index, &rows.column_leaves),
                }
            }
            RenderableRow::Subtotal { level, path, values } => {
                let group = path.segments().last().map(String::as_str).unwrap_or("");
                let caption = layout.subtotal_label(display_segment(group, &layout.blank_label));
                PivotRowView {
                    row_type: PivotRowType::Subtotal,
                    data_index: None,
                    subtotal_level: Some(*level),
                    labels: subtotal_labels(&covered_until, i, *level, levels, caption),
                    values: flatten_totals(values),
                }
            }
        };
        out.push(view);
    }

    out
}

/// The grand total row, labelled across every row-header column.
pub fn render_grand_total(rows: &RowLayout, layout: &PivotLayout) -> PivotRowView {
    PivotRowView {
        row_type: PivotRowType::GrandTotal,
        data_index: None,
        subtotal_level: None,
        labels: vec![LabelCell {
            level: 0,
            label: layout.grand_total_label.clone(),
            row_span: 1,
            col_span: rows.levels.max(1),
        }],
        values: flatten_totals(&rows.grand_total),
    }
}

/// Blank cells for uncovered columns before the subtotal's level, then the
/// caption in the first free column at or after it, spanning the rest.
fn subtotal_labels(
    covered_until: &[usize],
    row: usize,
    level: usize,
    levels: usize,
    caption: String,
) -> Vec<LabelCell> {
    let mut labels = Vec::new();
    for lvl in 0..levels {
        if covered_until[lvl] > row {
            continue;
        }
        if lvl >= level {
            labels.push(LabelCell {
                level: lvl,
                label: caption,
                row_span: 1,
                col_span: levels - lvl,
            });
            return labels;
        }
        labels.push(LabelCell {
            level: lvl,
            label: String::new(),
            row_span: 1,
            col_span: 1,
        });
    }
    labels
}

fn data_values(result: &PivotResult, row: usize, column_leaves: &[usize]) -> Vec<Option<f64>> {
    column_leaves
        .iter()
        .flat_map(|&col| (0..result.value_slots).map(move |slot| result.value(row, col, slot)))
        .collect()
}

fn flatten_totals(totals: &ColumnTotals) -> Vec<Option<f64>> {
    totals
        .iter()
        .flat_map(|slots| slots.iter().map(|v| Some(*v)))
        .collect()
}
