//! FILENAME: core/pivot-grid/src/session.rs
//! Pivot Session - memoized recomputation.
//!
//! Aggregation, tree building and row layout cover the whole axis and do
//! not depend on the page window, so a session keeps their output and only
//! rebuilds it when the records, the field selection, the subtotal toggle
//! or the blank label change. Moving between pages re-runs the re-spanner and the view alone.
//!
//! Records are identified by a version counter bumped on every
//! `set_records`, not by content.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cache::PivotResult;
use crate::definition::{FieldSelection, PageWindow, PivotLayout};
use crate::engine::calculate_pivot;
use crate::error::Result;
use crate::header::{build_header_layout, HeaderLayout};
use crate::layout::{build_row_layout, RowLayout};
use crate::paginate::{paginate, Pagination};
use crate::record::Record;
use crate::tree::CategoryTree;
use crate::view::{render_grand_total, render_rows, PivotRowView};

// ============================================================================
// MODEL
// ============================================================================

/// Everything computed over the full row axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotModel {
    pub result: PivotResult,
    pub row_tree: CategoryTree,
    pub col_tree: CategoryTree,
    pub header: HeaderLayout,
    pub rows: RowLayout,
}

impl PivotModel {
    /// Runs the full pipeline. `Ok(None)` when there is nothing to show.
    pub fn build(
        records: &[Record],
        selection: &FieldSelection,
        layout: &PivotLayout,
    ) -> Result<Option<Self>> {
        let result = match calculate_pivot(records, selection)? {
            Some(result) => result,
            None => return Ok(None),
        };

        let row_tree = CategoryTree::build(&result.row_keys);
        let col_tree = CategoryTree::build(&result.column_keys);
        let header = build_header_layout(&col_tree, selection, layout);
        let rows = build_row_layout(
            &result,
            &row_tree,
            &col_tree,
            selection.row_fields.len(),
            layout,
        );

        Ok(Some(PivotModel {
            result,
            row_tree,
            col_tree,
            header,
            rows,
        }))
    }

    /// Number of data rows on the row axis.
    pub fn total_rows(&self) -> usize {
        self.result.row_count()
    }

    /// Rendering instructions for `window`. Only the re-spanner and the
    /// view run here.
    pub fn render(&self, window: PageWindow, layout: &PivotLayout) -> PageView {
        let visible = paginate(&self.rows, window);
        let rows = render_rows(&visible, &self.rows, &self.result, layout);
        let grand_total = layout
            .show_grand_total
            .then(|| render_grand_total(&self.rows, layout));

        PageView {
            window,
            pagination: None,
            header: self.header.clone(),
            rows,
            grand_total,
        }
    }
}

/// One page of the pivot, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub window: PageWindow,

    /// Set when the page was requested by number.
    pub pagination: Option<Pagination>,

    pub header: HeaderLayout,

    /// Body rows on the page, data and subtotals interleaved.
    pub rows: Vec<PivotRowView>,

    /// Totals over the whole axis, regardless of the window.
    pub grand_total: Option<PivotRowView>,
}

// ============================================================================
// SESSION
// ============================================================================

/// Counters for cache behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub model_builds: u64,
    pub cache_hits: u64,
    pub page_renders: u64,
}

/// Inputs the full-axis model depends on. Page size and the subtotal and
/// grand total captions are read at render time and stay out of the key.
#[derive(Debug, Clone, PartialEq)]
struct ModelKey {
    records_version: u64,
    selection: FieldSelection,
    show_subtotals: bool,
    blank_label: String,
}

impl ModelKey {
    fn new(records_version: u64, selection: &FieldSelection, layout: &PivotLayout) -> Self {
        ModelKey {
            records_version,
            selection: selection.clone(),
            show_subtotals: layout.show_subtotals,
            blank_label: layout.blank_label.clone(),
        }
    }
}

#[derive(Debug)]
struct CachedModel {
    key: ModelKey,
    model: Option<PivotModel>,
}

/// Owns the inputs of a pivot and memoizes its full-axis model.
#[derive(Debug, Default)]
pub struct PivotSession {
    records: Arc<Vec<Record>>,
    records_version: u64,
    selection: FieldSelection,
    layout: PivotLayout,
    cached: Option<CachedModel>,
    stats: SessionStats,
}

impl PivotSession {
    pub fn new(records: Vec<Record>, selection: FieldSelection) -> Self {
        PivotSession {
            records: Arc::new(records),
            records_version: 1,
            selection,
            ..PivotSession::default()
        }
    }

    pub fn with_layout(mut self, layout: PivotLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Replaces the record set. Always invalidates the cached model.
    pub fn set_records(&mut self, records: impl Into<Arc<Vec<Record>>>) {
        self.records = records.into();
        self.records_version += 1;
    }

    pub fn selection(&self) -> &FieldSelection {
        &self.selection
    }

    /// Mutable access for field editing. The model is rebuilt on the next
    /// request only if the selection actually changed.
    pub fn selection_mut(&mut self) -> &mut FieldSelection {
        &mut self.selection
    }

    pub fn set_selection(&mut self, selection: FieldSelection) {
        self.selection = selection;
    }

    pub fn layout(&self) -> &PivotLayout {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: PivotLayout) {
        self.layout = layout;
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// The full-axis model, rebuilt only when an input changed.
    pub fn model(&mut self) -> Result<Option<&PivotModel>> {
        self.refresh()?;
        Ok(self.cached.as_ref().and_then(|c| c.model.as_ref()))
    }

    /// Renders the rows `[window.start, window.end)` of the row axis.
    pub fn page_window(&mut self, window: PageWindow) -> Result<Option<PageView>> {
        self.refresh()?;
        let model = match self.cached.as_ref().and_then(|c| c.model.as_ref()) {
            Some(model) => model,
            None => return Ok(None),
        };
        let view = model.render(window, &self.layout);
        self.stats.page_renders += 1;
        Ok(Some(view))
    }

    /// Renders 1-based page `page_number` using the configured page size.
    /// Out-of-range page numbers are clamped.
    pub fn page(&mut self, page_number: usize) -> Result<Option<PageView>> {
        self.refresh()?;
        let model = match self.cached.as_ref().and_then(|c| c.model.as_ref()) {
            Some(model) => model,
            None => return Ok(None),
        };
        let pagination = Pagination::new(model.total_rows(), self.layout.page_size, page_number)?;
        let mut view = model.render(pagination.window(), &self.layout);
        view.pagination = Some(pagination);
        self.stats.page_renders += 1;
        Ok(Some(view))
    }

    fn refresh(&mut self) -> Result<()> {
        let key = ModelKey::new(self.records_version, &self.selection, &self.layout);

        if matches!(&self.cached, Some(cached) if cached.key == key) {
            self.stats.cache_hits += 1;
            debug!(target: "pivot", "model cache hit (records v{})", self.records_version);
            return Ok(());
        }

        debug!(
            target: "pivot",
            "model cache miss (records v{}), rebuilding",
            self.records_version
        );
        let model = PivotModel::build(&self.records, &self.selection, &self.layout)?;
        self.stats.model_builds += 1;
        self.cached = Some(CachedModel { key, model });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AggregationType;
    use crate::error::PivotError;
    use crate::record::{record, RecordValue};
    use crate::view::PivotRowType;

    fn data() -> Vec<Record> {
        (0..5)
            .map(|i| {
                record([
                    ("dept", RecordValue::from(if i < 3 { "X" } else { "Y" })),
                    ("role", RecordValue::from(format!("r{}", i))),
                    ("quarter", RecordValue::from("Q1")),
                    ("sales", RecordValue::from(i as f64)),
                ])
            })
            .collect()
    }

    fn session() -> PivotSession {
        let selection = FieldSelection::new(["dept", "role"], ["quarter"], ["sales"], AggregationType::Sum);
        PivotSession::new(data(), selection).with_layout(PivotLayout {
            page_size: 2,
            ..PivotLayout::default()
        })
    }

    #[test]
    fn test_page_change_reuses_model() {
        let mut session = session();
        let first = session.page(1).unwrap().unwrap();
        let second = session.page(2).unwrap().unwrap();
        session.page_window(PageWindow { start: 1, end: 4 }).unwrap();

        let stats = session.stats();
        assert_eq!(stats.model_builds, 1);
        assert_eq!(stats.cache_hits, 2);
        assert_eq!(stats.page_renders, 3);

        assert_eq!(first.pagination.unwrap().total_pages, 3);
        assert_eq!(second.window, PageWindow { start: 2, end: 4 });
        assert_eq!(first.grand_total, second.grand_total);
    }

    #[test]
    fn test_input_changes_invalidate() {
        let mut session = session();
        session.page(1).unwrap();

        session.selection_mut().set_aggregation(AggregationType::Max);
        session.page(1).unwrap();
        assert_eq!(session.stats().model_builds, 2);

        // Same selection again: no rebuild.
        session.selection_mut().add_row_field("dept");
        session.page(1).unwrap();
        assert_eq!(session.stats().model_builds, 2);

        session.set_records(data());
        session.page(1).unwrap();
        assert_eq!(session.stats().model_builds, 3);
    }

    #[test]
    fn test_page_number_is_clamped() {
        let mut session = session();
        let page = session.page(99).unwrap().unwrap();
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.current_page, 3);
        assert_eq!(page.window, PageWindow { start: 4, end: 5 });
        let data_rows = page.rows.iter().filter(|r| r.row_type == PivotRowType::Data).count();
        assert_eq!(data_rows, 1);
    }

    #[test]
    fn test_incomplete_selection_has_no_page() {
        let selection = FieldSelection::new(["dept"], Vec::<String>::new(), ["sales"], AggregationType::Sum);
        let mut session = PivotSession::new(data(), selection);
        assert!(session.page(1).unwrap().is_none());
        assert!(session.model().unwrap().is_none());
        assert_eq!(session.stats().model_builds, 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let selection = FieldSelection::new(["nope"], ["quarter"], ["sales"], AggregationType::Sum);
        let mut session = PivotSession::new(data(), selection);
        assert!(matches!(session.page(1), Err(PivotError::UnknownFields { .. })));
        session.set_selection(FieldSelection::new(["dept"], ["quarter"], ["sales"], AggregationType::Sum));
        assert!(session.page(1).unwrap().is_some());
    }

    #[test]
    fn test_render_options_reuse_model() {
        let mut session = session();
        session.page(1).unwrap();

        session.set_layout(PivotLayout {
            page_size: 4,
            ..session.layout().clone()
        });
        let page = session.page(1).unwrap().unwrap();
        assert_eq!(page.pagination.unwrap().total_pages, 2);
        assert_eq!(session.stats().model_builds, 1);

        session.set_layout(PivotLayout {
            subtotal_prefix: "Sum".to_string(),
            grand_total_label: "All".to_string(),
            ..session.layout().clone()
        });
        let page = session.page(1).unwrap().unwrap();
        assert_eq!(session.stats().model_builds, 1);
        let subtotal = page
            .rows
            .iter()
            .find(|r| r.row_type == PivotRowType::Subtotal)
            .unwrap();
        assert_eq!(subtotal.labels.last().unwrap().label, "Sum X");
        assert_eq!(page.grand_total.unwrap().labels[0].label, "All");

        session.set_layout(PivotLayout {
            show_subtotals: false,
            ..session.layout().clone()
        });
        session.page(1).unwrap();
        assert_eq!(session.stats().model_builds, 2);
    }

    #[test]
    fn test_grand_total_hidden() {
        let mut session = session();
        session.set_layout(PivotLayout {
            show_grand_total: false,
            ..PivotLayout::default()
        });
        let page = session.page(1).unwrap().unwrap();
        assert!(page.grand_total.is_none());
    }
}
