//! FILENAME: core/pivot-grid/src/engine.rs
//! Pivot Engine - groups records and aggregates value fields.
//!
//! Algorithm:
//! 1. Validate the selection against the schema of the first record
//! 2. Single pass: compute row and column keys per record and fold the
//!    value fields into a function-local accumulator map
//! 3. Sort the distinct keys of each axis independently
//! 4. Lay the accumulators out as a rectangular matrix in sorted order

use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::smallvec;

use crate::cache::{CellAggregate, CellValues, PivotResult};
use crate::definition::FieldSelection;
use crate::error::{PivotError, Result};
use crate::key::CompositeKey;
use crate::record::{missing_fields, Record};

/// Aggregates `records` according to `selection`.
///
/// Returns `Ok(None)` when there is nothing to pivot: no records, no row or
/// column fields, or a non-count aggregation without value fields. A field
/// that the first record does not carry is an error naming every such field.
pub fn calculate_pivot(records: &[Record], selection: &FieldSelection) -> Result<Option<PivotResult>> {
    let sample = match records.first() {
        Some(r) => r,
        None => return Ok(None),
    };
    if !selection.is_complete() {
        return Ok(None);
    }

    let missing = missing_fields(sample, selection.all_fields());
    if !missing.is_empty() {
        warn!(target: "pivot", "missing fields in data: {}", missing.join(", "));
        return Err(PivotError::UnknownFields { fields: missing });
    }

    let counting_rows = selection.value_fields.is_empty();
    let slots = selection.value_slots();

    let mut cells: FxHashMap<(CompositeKey, CompositeKey), CellAggregate> = FxHashMap::default();
    let mut row_set: FxHashSet<CompositeKey> = FxHashSet::default();
    let mut col_set: FxHashSet<CompositeKey> = FxHashSet::default();

    for record in records {
        let row_key = CompositeKey::from_record(record, &selection.row_fields);
        let col_key = CompositeKey::from_record(record, &selection.column_fields);

        row_set.insert(row_key.clone());
        col_set.insert(col_key.clone());

        let agg = cells
            .entry((row_key, col_key))
            .or_insert_with(|| CellAggregate::new(slots));

        if counting_rows {
            agg.slots[0].add_occurrence();
            continue;
        }

        for (slot, field) in selection.value_fields.iter().enumerate() {
            let number = record.get(field).and_then(|v| v.as_number());
            if let Some(n) = number {
                agg.slots[slot].add_number(n);
            }
        }
    }

    let mut row_keys: Vec<CompositeKey> = row_set.into_iter().collect();
    let mut column_keys: Vec<CompositeKey> = col_set.into_iter().collect();
    row_keys.sort();
    column_keys.sort();

    let matrix = build_matrix(&row_keys, &column_keys, &cells, selection, counting_rows);

    debug!(
        target: "pivot",
        "aggregated {} records into {} rows x {} columns ({} non-empty cells)",
        records.len(),
        row_keys.len(),
        column_keys.len(),
        cells.len()
    );

    Ok(Some(PivotResult {
        row_keys,
        column_keys,
        matrix,
        value_slots: slots,
    }))
}

/// Places every accumulator at its sorted (row, column) position and fills
/// the gaps with explicit empty cells.
fn build_matrix(
    row_keys: &[CompositeKey],
    column_keys: &[CompositeKey],
    cells: &FxHashMap<(CompositeKey, CompositeKey), CellAggregate>,
    selection: &FieldSelection,
    counting_rows: bool,
) -> Vec<Vec<CellValues>> {
    let empty_cell: CellValues = if counting_rows {
        smallvec![Some(0.0)]
    } else {
        smallvec![None; selection.value_fields.len()]
    };

    let row_index: FxHashMap<&CompositeKey, usize> =
        row_keys.iter().enumerate().map(|(i, k)| (k, i)).collect();
    let col_index: FxHashMap<&CompositeKey, usize> =
        column_keys.iter().enumerate().map(|(i, k)| (k, i)).collect();

    let mut matrix = vec![vec![empty_cell; column_keys.len()]; row_keys.len()];

    for ((row_key, col_key), agg) in cells {
        if let (Some(&r), Some(&c)) = (row_index.get(row_key), col_index.get(col_key)) {
            matrix[r][c] = agg.finalize(selection.aggregation);
        }
    }

    matrix
}
