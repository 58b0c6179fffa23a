//! FILENAME: core/pivot-grid/src/header.rs
//! Column header layout.
//!
//! One header row per level of the column tree. Every node yields a single
//! cell on its level that spans its leaves (times the value slots); a leaf
//! that sits above the bottom level spans down through the remaining rows.
//! A final row names the statistic shown in each data column.

use serde::{Deserialize, Serialize};

use crate::definition::{FieldSelection, PivotLayout};
use crate::key::{display_segment, CompositeKey};
use crate::tree::{CategoryNode, CategoryTree};

/// A cell in a column header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCell {
    /// Key prefix from the root down to this node.
    pub key: CompositeKey,
    pub label: String,
    pub col_span: usize,
    pub row_span: usize,
}

/// A cell in the bottom header row: one per (column leaf, value slot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueHeaderCell {
    /// Column key index in the pivot result.
    pub column: usize,
    pub slot: usize,
    pub label: String,
}

/// Everything above the data rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeaderLayout {
    /// Row-field captions, each spanning every header row.
    pub corner: Vec<HeaderCell>,
    /// One row per column tree level, outermost first.
    pub rows: Vec<Vec<HeaderCell>>,
    pub value_row: Vec<ValueHeaderCell>,
}

impl HeaderLayout {
    /// Header rows including the value row.
    pub fn height(&self) -> usize {
        self.rows.len() + 1
    }

    /// Number of data columns (column leaves times value slots).
    pub fn data_width(&self) -> usize {
        self.value_row.len()
    }
}

/// Lays out the column headers for `col_tree`.
pub fn build_header_layout(
    col_tree: &CategoryTree,
    selection: &FieldSelection,
    layout: &PivotLayout,
) -> HeaderLayout {
    let depth = col_tree.depth;
    let slots = selection.value_slots();
    let mut rows: Vec<Vec<HeaderCell>> = vec![Vec::new(); depth];

    let mut path: Vec<String> = Vec::with_capacity(depth);
    for root in &col_tree.roots {
        visit(root, 1, depth, slots, layout, &mut path, &mut rows);
    }

    let mut value_row = Vec::with_capacity(col_tree.leaf_count() * slots);
    for column in col_tree.leaf_indices() {
        for slot in 0..slots {
            value_row.push(ValueHeaderCell {
                column,
                slot,
                label: value_label(selection, slot),
            });
        }
    }

    let corner = selection
        .row_fields
        .iter()
        .map(|field| HeaderCell {
            key: CompositeKey::default(),
            label: field.clone(),
            col_span: 1,
            row_span: depth + 1,
        })
        .collect();

    HeaderLayout {
        corner,
        rows,
        value_row,
    }
}

fn visit(
    node: &CategoryNode,
    level: usize,
    depth: usize,
    slots: usize,
    layout: &PivotLayout,
    path: &mut Vec<String>,
    rows: &mut [Vec<HeaderCell>],
) {
    path.push(node.label.clone());

    let row_span = if node.is_leaf() { depth - level + 1 } else { 1 };
    rows[level - 1].push(HeaderCell {
        key: CompositeKey::new(path.iter().cloned()),
        label: display_segment(&node.label, &layout.blank_label).to_string(),
        col_span: node.leaf_count.max(1) * slots,
        row_span,
    });

    for child in &node.children {
        visit(child, level + 1, depth, slots, layout, path, rows);
    }

    path.pop();
}

/// `agg(field)` for a value slot; the synthetic count slot reads `count(Value)`.
pub fn value_label(selection: &FieldSelection, slot: usize) -> String {
    let field = selection
        .value_fields
        .get(slot)
        .map(String::as_str)
        .unwrap_or("Value");
    format!("{}({})", selection.aggregation, field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AggregationType;

    fn tree(raw: &[&[&str]]) -> CategoryTree {
        let keys: Vec<CompositeKey> = raw.iter().map(|k| CompositeKey::new(k.iter().copied())).collect();
        CategoryTree::build(&keys)
    }

    #[test]
    fn test_two_level_headers() {
        let col_tree = tree(&[&["2023", "Q1"], &["2023", "Q2"], &["2024", "Q1"]]);
        let selection = FieldSelection::new(["dept"], ["year", "quarter"], ["sales"], AggregationType::Sum);
        let header = build_header_layout(&col_tree, &selection, &PivotLayout::default());

        assert_eq!(header.rows.len(), 2);
        assert_eq!(header.height(), 3);
        let top: Vec<(&str, usize, usize)> = header.rows[0]
            .iter()
            .map(|c| (c.label.as_str(), c.col_span, c.row_span))
            .collect();
        assert_eq!(top, vec![("2023", 2, 1), ("2024", 1, 1)]);
        assert_eq!(header.rows[1].len(), 3);
        assert!(header.rows[1].iter().all(|c| c.col_span == 1 && c.row_span == 1));
        assert_eq!(header.rows[1][1].key.segments(), &["2023".to_string(), "Q2".to_string()]);

        assert_eq!(header.value_row.len(), 3);
        assert_eq!(header.value_row[0].label, "sum(sales)");
        assert_eq!(header.corner.len(), 1);
        assert_eq!(header.corner[0].label, "dept");
        assert_eq!(header.corner[0].row_span, 3);
    }

    #[test]
    fn test_spans_scale_with_value_fields() {
        let col_tree = tree(&[&["A", "x"], &["A", "y"]]);
        let selection = FieldSelection::new(["dept"], ["g", "h"], ["sales", "units"], AggregationType::Max);
        let header = build_header_layout(&col_tree, &selection, &PivotLayout::default());

        assert_eq!(header.rows[0][0].col_span, 4);
        assert_eq!(header.rows[1][0].col_span, 2);
        let labels: Vec<&str> = header.value_row.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["max(sales)", "max(units)", "max(sales)", "max(units)"]);
        assert_eq!(header.data_width(), 4);
    }

    #[test]
    fn test_leaf_above_bottom_spans_down() {
        // Keys of unequal length only arise from hand-built trees, but the
        // span arithmetic must still reach the bottom row.
        let col_tree = tree(&[&["A", "x", "1"], &["B"]]);
        let selection = FieldSelection::new(["dept"], ["g"], Vec::<String>::new(), AggregationType::Count);
        let header = build_header_layout(&col_tree, &selection, &PivotLayout::default());

        assert_eq!(header.rows.len(), 3);
        let b = header.rows[0].iter().find(|c| c.label == "B").unwrap();
        assert_eq!(b.row_span, 3);
        assert_eq!(header.rows[2][0].row_span, 1);
        assert_eq!(header.value_row[0].label, "count(Value)");
    }

    #[test]
    fn test_blank_label() {
        let col_tree = tree(&[&[""], &["Eng"]]);
        let selection = FieldSelection::new(["dept"], ["role"], Vec::<String>::new(), AggregationType::Count);
        let header = build_header_layout(&col_tree, &selection, &PivotLayout::default());
        assert_eq!(header.rows[0][0].label, "(blank)");
    }
}
