//! FILENAME: core/pivot-grid/src/export.rs
//! Flat export of the full, unpaginated pivot result.
//!
//! One header row (`""` followed by every column key) and one row per row
//! key holding the first value slot of each cell. Absent values export as
//! empty strings. Writing the table out (CSV or otherwise) is left to the
//! caller.

use serde::{Deserialize, Serialize};

use crate::cache::PivotResult;
use crate::definition::PivotLayout;

/// Separator between key segments in exported labels.
pub const EXPORT_SEGMENT_SEPARATOR: &str = " / ";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlatTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FlatTable {
    /// Header plus body rows.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    /// Every row including the header, in output order.
    pub fn lines(&self) -> impl Iterator<Item = &[String]> {
        std::iter::once(self.header.as_slice()).chain(self.rows.iter().map(Vec::as_slice))
    }
}

pub fn export_flat(result: &PivotResult, layout: &PivotLayout) -> FlatTable {
    let mut header = Vec::with_capacity(result.column_count() + 1);
    header.push(String::new());
    header.extend(
        result
            .column_keys
            .iter()
            .map(|key| key.display(&layout.blank_label, EXPORT_SEGMENT_SEPARATOR)),
    );

    let rows = result
        .row_keys
        .iter()
        .enumerate()
        .map(|(r, key)| {
            let mut line = Vec::with_capacity(result.column_count() + 1);
            line.push(key.display(&layout.blank_label, EXPORT_SEGMENT_SEPARATOR));
            line.extend((0..result.column_count()).map(|c| {
                result
                    .value(r, c, 0)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            }));
            line
        })
        .collect();

    FlatTable { header, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{AggregationType, FieldSelection};
    use crate::engine::calculate_pivot;
    use crate::record::{record, Record, RecordValue};

    fn rec(dept: &str, role: &str, quarter: &str, sales: RecordValue) -> Record {
        record([
            ("dept", RecordValue::from(dept)),
            ("role", RecordValue::from(role)),
            ("quarter", RecordValue::from(quarter)),
            ("sales", sales),
        ])
    }

    #[test]
    fn test_export_layout() {
        let data = vec![
            rec("X", "Eng", "Q1", RecordValue::from(10.0)),
            rec("X", "Eng", "Q2", RecordValue::from(2.5)),
            rec("Y", "", "Q1", RecordValue::from(4.0)),
        ];
        let selection = FieldSelection::new(["dept", "role"], ["quarter"], ["sales"], AggregationType::Sum);
        let result = calculate_pivot(&data, &selection).unwrap().unwrap();
        let table = export_flat(&result, &PivotLayout::default());

        assert_eq!(table.header, vec!["", "Q1", "Q2"]);
        assert_eq!(table.rows[0], vec!["X / Eng", "10", "2.5"]);
        // No Y record in Q2: the cell is absent.
        assert_eq!(table.rows[1], vec!["Y / (blank)", "4", ""]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn test_export_uses_first_value_slot() {
        let data = vec![record([
            ("dept", RecordValue::from("X")),
            ("quarter", RecordValue::from("Q1")),
            ("sales", RecordValue::from(3.0)),
            ("units", RecordValue::from(7.0)),
        ])];
        let selection = FieldSelection::new(["dept"], ["quarter"], ["sales", "units"], AggregationType::Max);
        let result = calculate_pivot(&data, &selection).unwrap().unwrap();
        let table = export_flat(&result, &PivotLayout::default());
        assert_eq!(table.rows, vec![vec!["X".to_string(), "3".to_string()]]);
    }

    #[test]
    fn test_count_only_export() {
        let data = vec![
            rec("X", "Eng", "Q1", RecordValue::Empty),
            rec("X", "Eng", "Q1", RecordValue::Empty),
            rec("Y", "Eng", "Q2", RecordValue::Empty),
        ];
        let selection = FieldSelection::new(["dept"], ["quarter"], Vec::<String>::new(), AggregationType::Count);
        let result = calculate_pivot(&data, &selection).unwrap().unwrap();
        let table = export_flat(&result, &PivotLayout::default());
        // Count-only empty cells hold 0.
        assert_eq!(table.rows[0], vec!["X", "2", "0"]);
        assert_eq!(table.rows[1], vec!["Y", "0", "1"]);
    }
}
