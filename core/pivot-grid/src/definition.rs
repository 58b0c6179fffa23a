//! FILENAME: core/pivot-grid/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains the types that DESCRIBE a pivot:
//! - which fields group the rows and the columns,
//! - which fields are aggregated and how,
//! - how the result is laid out (subtotals, labels, page size),
//! - which slice of the row axis is on screen.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PivotError, Result};

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for value fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    #[default]
    Count,
    Sum,
    #[serde(rename = "avg", alias = "average")]
    Average,
    Min,
    Max,
}

impl AggregationType {
    /// Short name used in value headers, e.g. `sum(Sales)`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::Count => "count",
            AggregationType::Sum => "sum",
            AggregationType::Average => "avg",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
        }
    }

    /// Every kind except count needs at least one value field.
    pub fn requires_value_field(&self) -> bool {
        !matches!(self, AggregationType::Count)
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FIELD SELECTION
// ============================================================================

/// Which fields drive each axis, which are aggregated, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSelection {
    /// Row grouping fields, outer to inner.
    #[serde(default)]
    pub row_fields: Vec<String>,

    /// Column grouping fields, outer to inner.
    #[serde(default)]
    pub column_fields: Vec<String>,

    /// Fields aggregated into each cell.
    #[serde(default)]
    pub value_fields: Vec<String>,

    #[serde(default)]
    pub aggregation: AggregationType,
}

impl FieldSelection {
    pub fn new<R, C, V>(rows: R, columns: C, values: V, aggregation: AggregationType) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        FieldSelection {
            row_fields: rows.into_iter().map(Into::into).collect(),
            column_fields: columns.into_iter().map(Into::into).collect(),
            value_fields: values.into_iter().map(Into::into).collect(),
            aggregation,
        }
    }

    /// Number of value slots per cell. Counting with no value fields still
    /// uses one synthetic slot.
    pub fn value_slots(&self) -> usize {
        self.value_fields.len().max(1)
    }

    /// True when the selection can produce a result: both axes have a field
    /// and the aggregation has something to aggregate.
    pub fn is_complete(&self) -> bool {
        !self.row_fields.is_empty()
            && !self.column_fields.is_empty()
            && !(self.aggregation.requires_value_field() && self.value_fields.is_empty())
    }

    /// Every selected field name, row fields first.
    pub fn all_fields(&self) -> impl Iterator<Item = &str> {
        self.row_fields
            .iter()
            .chain(self.column_fields.iter())
            .chain(self.value_fields.iter())
            .map(String::as_str)
    }

    pub fn add_row_field(&mut self, field: impl Into<String>) {
        push_unique(&mut self.row_fields, field.into());
    }

    pub fn add_column_field(&mut self, field: impl Into<String>) {
        push_unique(&mut self.column_fields, field.into());
    }

    pub fn add_value_field(&mut self, field: impl Into<String>) {
        push_unique(&mut self.value_fields, field.into());
    }

    pub fn remove_row_field(&mut self, field: &str) {
        self.row_fields.retain(|f| f != field);
    }

    pub fn remove_column_field(&mut self, field: &str) {
        self.column_fields.retain(|f| f != field);
    }

    pub fn remove_value_field(&mut self, field: &str) {
        self.value_fields.retain(|f| f != field);
    }

    pub fn clear_row_fields(&mut self) {
        self.row_fields.clear();
    }

    pub fn clear_column_fields(&mut self) {
        self.column_fields.clear();
    }

    pub fn clear_value_fields(&mut self) {
        self.value_fields.clear();
    }

    pub fn set_aggregation(&mut self, aggregation: AggregationType) {
        self.aggregation = aggregation;
    }
}

fn push_unique(fields: &mut Vec<String>, field: String) {
    if !fields.contains(&field) {
        fields.push(field);
    }
}

// ============================================================================
// LAYOUT OPTIONS
// ============================================================================

/// Controls how the pivot is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotLayout {
    /// Emit a subtotal row after every group above the innermost row level.
    pub show_subtotals: bool,

    /// Emit the grand total row.
    pub show_grand_total: bool,

    /// Placeholder shown for empty key segments.
    pub blank_label: String,

    /// Subtotal rows are labelled `"{subtotal_prefix} {group}"`.
    pub subtotal_prefix: String,

    pub grand_total_label: String,

    /// Data rows per page.
    pub page_size: usize,
}

impl Default for PivotLayout {
    fn default() -> Self {
        PivotLayout {
            show_subtotals: true,
            show_grand_total: true,
            blank_label: "(blank)".to_string(),
            subtotal_prefix: "Total".to_string(),
            grand_total_label: "Grand Total".to_string(),
            page_size: 20,
        }
    }
}

impl PivotLayout {
    /// Parses layout options from JSON. Missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let layout: PivotLayout = serde_json::from_str(text)?;
        if layout.page_size == 0 {
            return Err(PivotError::InvalidPageSize);
        }
        Ok(layout)
    }

    pub fn subtotal_label(&self, group: &str) -> String {
        format!("{} {}", self.subtotal_prefix, group)
    }
}

// ============================================================================
// PAGE WINDOW
// ============================================================================

/// Half-open range `[start, end)` of data-row indices on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(PivotError::InvalidWindow { start, end });
        }
        Ok(PageWindow { start, end })
    }

    /// Window covering every row of an axis with `len` rows.
    pub fn all(len: usize) -> Self {
        PageWindow { start: 0, end: len }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
