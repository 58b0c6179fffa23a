//! FILENAME: core/pivot-grid/src/lib.rs
//! Cross-tabulation engine.
//!
//! Groups flat records by row and column fields, aggregates value fields
//! into a rectangular matrix, and lays the result out as a hierarchical
//! grid with spanning headers, subtotal rows, a grand total and paging.
//! The crate never renders anything itself; it hands per-row instructions
//! to whatever does.
//!
//! Layers:
//! - `definition`: Field selection and layout options (what the pivot IS)
//! - `record` / `key`: Input scalars and composite keys
//! - `cache` / `engine`: Aggregation into a `PivotResult` (HOW we compute)
//! - `tree` / `header` / `layout`: Axis hierarchies, headers, subtotals
//! - `paginate` / `view`: Page windows and rendering instructions (WHAT we display)
//! - `session`: Memoized recomputation across input changes
//! - `export`: Flat table of the full result

pub mod error;
pub mod definition;
pub mod record;
pub mod key;
pub mod cache;
pub mod engine;
pub mod tree;
pub mod header;
pub mod layout;
pub mod paginate;
pub mod view;
pub mod session;
pub mod export;

pub use error::{PivotError, Result};
pub use definition::*;
pub use record::{record, missing_fields, parse_number, Record, RecordValue};
pub use key::{compare_keys, compare_segments, CompositeKey, KEY_DELIMITER};
pub use cache::*;
pub use engine::calculate_pivot;
pub use tree::{CategoryNode, CategoryTree};
pub use header::{build_header_layout, value_label, HeaderCell, HeaderLayout, ValueHeaderCell};
pub use layout::{build_row_layout, grand_totals, ColumnTotals, RenderableRow, RowLayout};
pub use paginate::{paginate, respan, Pagination, VisibleRow};
pub use view::*;
pub use session::{PageView, PivotModel, PivotSession, SessionStats};
pub use export::{export_flat, FlatTable};
