//! FILENAME: tests/common/mod.rs
//! Shared fixtures for the pivot integration tests.

#![allow(dead_code)]

use pivot_grid::{record, AggregationType, FieldSelection, PivotResult, Record, RecordValue};

// ============================================================================
// FIXTURES
// ============================================================================

pub struct SalesFixture;

impl SalesFixture {
    pub fn headers() -> Vec<&'static str> {
        vec!["Region", "Product", "Quarter", "Sales", "Quantity"]
    }

    pub fn data() -> Vec<(&'static str, &'static str, &'static str, f64, f64)> {
        vec![
            ("North", "Widget", "Q1", 10000.0, 100.0),
            ("North", "Widget", "Q2", 12000.0, 120.0),
            ("North", "Gadget", "Q1", 8000.0, 80.0),
            ("North", "Gadget", "Q2", 9000.0, 90.0),
            ("South", "Widget", "Q1", 15000.0, 150.0),
            ("South", "Widget", "Q2", 14000.0, 140.0),
            ("South", "Gadget", "Q1", 11000.0, 110.0),
            ("South", "Gadget", "Q2", 13000.0, 130.0),
            ("East", "Widget", "Q1", 9000.0, 90.0),
            ("East", "Widget", "Q2", 11000.0, 110.0),
            ("East", "Gadget", "Q1", 7000.0, 70.0),
            ("East", "Gadget", "Q2", 8500.0, 85.0),
        ]
    }

    pub fn records() -> Vec<Record> {
        Self::data()
            .into_iter()
            .map(|(region, product, quarter, sales, quantity)| {
                record([
                    ("Region", RecordValue::from(region)),
                    ("Product", RecordValue::from(product)),
                    ("Quarter", RecordValue::from(quarter)),
                    ("Sales", RecordValue::from(sales)),
                    ("Quantity", RecordValue::from(quantity)),
                ])
            })
            .collect()
    }
}

/// The three-record department dataset used by the small scenarios.
pub struct DeptFixture;

impl DeptFixture {
    pub fn records() -> Vec<Record> {
        vec![
            Self::row("X", "Eng", 10.0),
            Self::row("X", "Eng", 20.0),
            Self::row("Y", "Sales", 5.0),
        ]
    }

    pub fn row(dept: &str, role: &str, sales: f64) -> Record {
        record([
            ("dept", RecordValue::from(dept)),
            ("role", RecordValue::from(role)),
            ("quarter", RecordValue::from("Q1")),
            ("sales", RecordValue::from(sales)),
        ])
    }
}

pub fn selection(rows: &[&str], columns: &[&str], values: &[&str], aggregation: AggregationType) -> FieldSelection {
    FieldSelection::new(
        rows.iter().copied(),
        columns.iter().copied(),
        values.iter().copied(),
        aggregation,
    )
}

// ============================================================================
// ASSERTION HELPERS
// ============================================================================

/// Assert that a cell's first value slot holds an expected number.
pub fn assert_cell_number(result: &PivotResult, row: usize, col: usize, expected: f64) {
    match result.value(row, col, 0) {
        Some(n) => assert!(
            (n - expected).abs() < 0.001,
            "Cell ({}, {}) expected {} but got {}",
            row, col, expected, n
        ),
        None => panic!("Cell ({}, {}) expected {} but was absent", row, col, expected),
    }
}

/// Row keys rendered with " / " between segments.
pub fn row_labels(result: &PivotResult) -> Vec<String> {
    result.row_keys.iter().map(|k| k.to_string()).collect()
}

pub fn column_labels(result: &PivotResult) -> Vec<String> {
    result.column_keys.iter().map(|k| k.to_string()).collect()
}
