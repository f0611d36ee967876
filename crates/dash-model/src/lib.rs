//! Data model for the associative dashboard engine.
//!
//! Datasets are ordered rows of tagged scalar cells; selections are immutable
//! snapshots mapping fields to selected values.

pub mod dashboard;
pub mod enums;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod selection;
pub mod table;
pub mod value;

pub use dashboard::{
    DEFAULT_SHEET_ID, DEFAULT_TITLE, Dashboard, Sheet, Widget, WidgetConfig, WidgetKind,
    default_sheet,
};
pub use enums::{MeasureOp, ValueState};
pub use error::{ModelError, Result};
pub use ids::{FieldName, SheetId};
pub use metadata::{FieldKind, FieldMetadata};
pub use selection::{SelectionSnapshot, ValueSet, parse_selection_arg};
pub use table::{Dataset, Row};
pub use value::{CellValue, DATE_FORMAT, parse_date};
