//! FILENAME: core/pivot-grid/src/cache.rs
//! Pivot Cache - accumulators and the aggregated result.
//!
//! Accumulators fold raw numbers per (row key, column key, value field)
//! during the single scan over the records. `PivotResult` is the finished,
//! sorted, fully rectangular output of that scan.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::definition::AggregationType;
use crate::key::CompositeKey;

/// Per-value-field outputs of one cell. `None` marks an empty cell.
pub type CellValues = SmallVec<[Option<f64>; 2]>;

// ============================================================================
// AGGREGATE ACCUMULATOR
// ============================================================================

/// Running statistics for one (row key, column key, value field) triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateAccumulator {
    pub sum: f64,
    pub count: u64,
    /// +inf until the first number is folded in.
    pub min: f64,
    /// -inf until the first number is folded in.
    pub max: f64,
}

impl Default for AggregateAccumulator {
    fn default() -> Self {
        AggregateAccumulator::new()
    }
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        AggregateAccumulator {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Adds a numeric value to the accumulator.
    pub fn add_number(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Counts a record without a value (count-only pivots).
    pub fn add_occurrence(&mut self) {
        self.count += 1;
    }

    /// Smallest folded value, `None` while nothing was folded.
    pub fn min_value(&self) -> Option<f64> {
        (self.count > 0 && self.min.is_finite()).then_some(self.min)
    }

    /// Largest folded value, `None` while nothing was folded.
    pub fn max_value(&self) -> Option<f64> {
        (self.count > 0 && self.max.is_finite()).then_some(self.max)
    }

    /// Computes the final aggregate value. Empty accumulators yield 0.
    pub fn compute(&self, aggregation: AggregationType) -> f64 {
        match aggregation {
            AggregationType::Count => self.count as f64,
            AggregationType::Sum => self.sum,
            AggregationType::Average => {
                if self.count > 0 {
                    self.sum / (self.count as f64)
                } else {
                    0.0
                }
            }
            AggregationType::Min => self.min_value().unwrap_or(0.0),
            AggregationType::Max => self.max_value().unwrap_or(0.0),
        }
    }

    /// Merges another accumulator into this one.
    pub fn merge(&mut self, other: &AggregateAccumulator) {
        self.sum += other.sum;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

/// Accumulators for every value slot of one cell.
#[derive(Debug, Clone)]
pub struct CellAggregate {
    pub slots: SmallVec<[AggregateAccumulator; 2]>,
}

impl CellAggregate {
    pub fn new(value_slots: usize) -> Self {
        CellAggregate {
            slots: smallvec![AggregateAccumulator::new(); value_slots],
        }
    }

    pub fn finalize(&self, aggregation: AggregationType) -> CellValues {
        self.slots
            .iter()
            .map(|acc| Some(acc.compute(aggregation)))
            .collect()
    }
}

// ============================================================================
// PIVOT RESULT
// ============================================================================

/// The aggregated pivot: sorted distinct keys per axis and a
/// `[row][column][value slot]` matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotResult {
    pub row_keys: Vec<CompositeKey>,
    pub column_keys: Vec<CompositeKey>,
    pub matrix: Vec<Vec<CellValues>>,
    /// Length of every cell's value list.
    pub value_slots: usize,
}

impl PivotResult {
    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_keys.len()
    }

    /// Values of one cell. Out-of-range coordinates give an empty slice.
    pub fn cell(&self, row: usize, col: usize) -> &[Option<f64>] {
        self.matrix
            .get(row)
            .and_then(|r| r.get(col))
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// One value of one cell, `None` when empty or out of range.
    pub fn value(&self, row: usize, col: usize, slot: usize) -> Option<f64> {
        self.cell(row, col).get(slot).copied().flatten()
    }

    /// True when the matrix has one row per row key, one column per column
    /// key, and `value_slots` entries per cell.
    pub fn is_rectangular(&self) -> bool {
        self.matrix.len() == self.row_keys.len()
            && self.matrix.iter().all(|row| {
                row.len() == self.column_keys.len()
                    && row.iter().all(|cell| cell.len() == self.value_slots)
            })
    }
}
