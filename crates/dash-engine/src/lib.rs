//! Associative selection engine.
//!
//! - [`SelectionStore`] holds the active selection as immutable snapshots.
//! - [`classify_field`] and [`Evaluator`] label every value of a field as
//!   selected, possible or excluded under a snapshot.
//! - [`aggregate`] and [`kpi`] summarise the rows compatible with a snapshot.
//! - [`widget_data`] dispatches a stored widget to the right computation.

pub mod aggregate;
pub mod evaluator;
pub mod store;
pub mod widget;

pub use aggregate::{
    AggregateEntry, AggregateOptions, DEFAULT_TOP_N, Kpi, aggregate, kpi, round2, sort_by_key,
};
pub use evaluator::{
    ClassifiedValue, ClassifyOptions, Evaluator, FieldClassification, classify_field,
    classify_field_with, possible_rows, possible_rows_excluding,
};
pub use store::{SelectionChip, SelectionStore};
pub use widget::{RenderedWidget, WidgetData, render_widgets, widget_data};
