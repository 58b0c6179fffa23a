//! FILENAME: core/pivot-grid/src/layout.rs
//! Row layout: data rows, subtotal rows and row-header spans.
//!
//! Algorithm (bottom-up):
//! 1. Measure every row-tree node: a leaf covers its data row; a group
//!    covers its children plus its own subtotal row
//! 2. Fold cell values upward in the same pass so every group knows its
//!    subtotal per column leaf and value slot
//! 3. Walk the tree depth-first, children before the group's subtotal,
//!    handing each row the measured span of its ancestor at every level
//!
//! Subtotal policy: every group above the innermost row level gets a
//! subtotal row (when enabled); the innermost level never does.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::cache::PivotResult;
use crate::definition::PivotLayout;
use crate::key::CompositeKey;
use crate::tree::{CategoryNode, CategoryTree};

/// Summed values per column leaf (tree order), then per value slot.
pub type ColumnTotals = Vec<SmallVec<[f64; 2]>>;

/// One row of the body, before pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderableRow {
    Data {
        /// Row key index in the pivot result.
        index: usize,
        /// The full row key.
        path: CompositeKey,
        /// Span of the ancestor group at each row level.
        spans: Vec<usize>,
    },
    Subtotal {
        /// Row level of the group this row closes (0 = outermost).
        level: usize,
        /// Key prefix of the group, `level + 1` segments long.
        path: CompositeKey,
        values: ColumnTotals,
    },
}

impl RenderableRow {
    pub fn is_data(&self) -> bool {
        matches!(self, RenderableRow::Data { .. })
    }

    pub fn path(&self) -> &CompositeKey {
        match self {
            RenderableRow::Data { path, .. } | RenderableRow::Subtotal { path, .. } => path,
        }
    }

    /// Data row index, `None` for subtotals.
    pub fn data_index(&self) -> Option<usize> {
        match self {
            RenderableRow::Data { index, .. } => Some(*index),
            RenderableRow::Subtotal { .. } => None,
        }
    }

    /// Subtotal level, `None` for data rows.
    pub fn subtotal_level(&self) -> Option<usize> {
        match self {
            RenderableRow::Subtotal { level, .. } => Some(*level),
            RenderableRow::Data { .. } => None,
        }
    }
}

/// The unpaginated body of the pivot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowLayout {
    /// Number of row-header levels (row fields).
    pub levels: usize,
    pub rows: Vec<RenderableRow>,
    /// Column key indices in display order.
    pub column_leaves: Vec<usize>,
    pub value_slots: usize,
    /// Sums over every data row, ignoring pagination.
    pub grand_total: ColumnTotals,
}

impl RowLayout {
    pub fn data_row_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_data()).count()
    }
}

// ============================================================================
// MEASURED TREE
// ============================================================================

/// A row-tree node with its row count and folded subtotal.
struct Measured<'a> {
    node: &'a CategoryNode,
    total_rows: usize,
    emits_subtotal: bool,
    totals: ColumnTotals,
    children: Vec<Measured<'a>>,
}

struct LayoutContext<'a> {
    result: &'a PivotResult,
    column_leaves: &'a [usize],
    levels: usize,
    show_subtotals: bool,
}

impl<'a> LayoutContext<'a> {
    fn measure(&self, node: &'a CategoryNode, level: usize) -> Measured<'a> {
        if node.is_leaf() {
            let (total_rows, totals) = match node.leaf_index {
                Some(index) => (1, row_totals(self.result, index, self.column_leaves)),
                None => (0, zero_totals(self.column_leaves.len(), self.result.value_slots)),
            };
            return Measured {
                node,
                total_rows,
                emits_subtotal: false,
                totals,
                children: Vec::new(),
            };
        }

        let children: Vec<Measured<'a>> = node
            .children
            .iter()
            .map(|child| self.measure(child, level + 1))
            .collect();

        let mut totals = zero_totals(self.column_leaves.len(), self.result.value_slots);
        for child in &children {
            add_totals(&mut totals, &child.totals);
        }

        let emits_subtotal = self.show_subtotals && level + 1 < self.levels;
        let total_rows =
            children.iter().map(|c| c.total_rows).sum::<usize>() + usize::from(emits_subtotal);

        Measured {
            node,
            total_rows,
            emits_subtotal,
            totals,
            children,
        }
    }

    fn emit(
        &self,
        measured: &Measured<'_>,
        level: usize,
        parent_spans: &[usize],
        path: &mut Vec<String>,
        out: &mut Vec<RenderableRow>,
    ) {
        let mut spans = parent_spans.to_vec();
        if level < spans.len() {
            spans[level] = measured.total_rows;
        }
        path.push(measured.node.label.clone());

        if measured.children.is_empty() {
            if let Some(index) = measured.node.leaf_index {
                out.push(RenderableRow::Data {
                    index,
                    path: self.result.row_keys[index].clone(),
                    spans,
                });
            }
        } else {
            for child in &measured.children {
                self.emit(child, level + 1, &spans, path, out);
            }
            if measured.emits_subtotal {
                out.push(RenderableRow::Subtotal {
                    level,
                    path: CompositeKey::new(path.iter().cloned()),
                    values: measured.totals.clone(),
                });
            }
        }

        path.pop();
    }
}

/// Lays out the full row axis of `result`.
///
/// `levels` is the number of row fields. `row_tree` must be built from
/// `result.row_keys` and `col_tree` from `result.column_keys`.
pub fn build_row_layout(
    result: &PivotResult,
    row_tree: &CategoryTree,
    col_tree: &CategoryTree,
    levels: usize,
    layout: &PivotLayout,
) -> RowLayout {
    let column_leaves = col_tree.leaf_indices();
    let ctx = LayoutContext {
        result,
        column_leaves: &column_leaves,
        levels,
        show_subtotals: layout.show_subtotals,
    };

    let measured: Vec<Measured<'_>> = row_tree.roots.iter().map(|r| ctx.measure(r, 0)).collect();

    let mut rows = Vec::with_capacity(measured.iter().map(|m| m.total_rows).sum());
    let root_spans = vec![0; levels];
    let mut path = Vec::with_capacity(levels);
    for m in &measured {
        ctx.emit(m, 0, &root_spans, &mut path, &mut rows);
    }

    let grand_total = grand_totals(result, &column_leaves);

    RowLayout {
        levels,
        rows,
        column_leaves,
        value_slots: result.value_slots,
        grand_total,
    }
}

/// Sums every row of `result` per column leaf and value slot.
pub fn grand_totals(result: &PivotResult, column_leaves: &[usize]) -> ColumnTotals {
    let mut totals = zero_totals(column_leaves.len(), result.value_slots);
    for row in 0..result.row_count() {
        add_totals(&mut totals, &row_totals(result, row, column_leaves));
    }
    totals
}

fn row_totals(result: &PivotResult, row: usize, column_leaves: &[usize]) -> ColumnTotals {
    column_leaves
        .iter()
        .map(|&col| {
            (0..result.value_slots)
                .map(|slot| result.value(row, col, slot).unwrap_or(0.0))
                .collect()
        })
        .collect()
}

fn zero_totals(columns: usize, slots: usize) -> ColumnTotals {
    vec![smallvec![0.0; slots]; columns]
}

fn add_totals(into: &mut ColumnTotals, from: &ColumnTotals) {
    for (dst, src) in into.iter_mut().zip(from.iter()) {
        for (d, s) in dst.iter_mut().zip(src.iter()) {
            *d += s;
        }
    }
}
