//! Selection state management.
//!
//! [`SelectionStore`] owns the authoritative [`SelectionSnapshot`]. Every
//! mutation swaps in a new snapshot and hands a copy back to the caller, so
//! snapshots given out earlier never change underneath their readers.

use dash_model::{CellValue, Dataset, FieldName, SelectionSnapshot, ValueSet};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    snapshot: SelectionSnapshot,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from a previously persisted snapshot.
    pub fn from_snapshot(snapshot: SelectionSnapshot) -> Self {
        Self { snapshot }
    }

    /// Current snapshot. Cheap: the snapshot is reference counted.
    pub fn snapshot(&self) -> SelectionSnapshot {
        self.snapshot.clone()
    }

    /// Add `value` to `field`'s selection, or remove it if already selected.
    pub fn toggle(&mut self, field: impl Into<FieldName>, value: CellValue) -> SelectionSnapshot {
        let field = field.into();
        let next = self.snapshot.toggled(&field, &value);
        debug!(
            field = %field,
            value = %value,
            selected = next.contains(field.as_str(), &value),
            active_fields = next.len(),
            "toggle selection"
        );
        self.replace(next)
    }

    /// Constrain `field` to exactly `values`; an empty list clears the field.
    pub fn select_only(
        &mut self,
        field: impl Into<FieldName>,
        values: impl IntoIterator<Item = CellValue>,
    ) -> SelectionSnapshot {
        let field = field.into();
        let next = self.snapshot.with_field(&field, values);
        debug!(
            field = %field,
            selected = next.get(field.as_str()).map_or(0, ValueSet::len),
            "replace field selection"
        );
        self.replace(next)
    }

    /// Remove every selected value of `field`.
    ///
    /// Clearing a field without a selection returns the current snapshot
    /// unchanged.
    pub fn clear_field(&mut self, field: &str) -> SelectionSnapshot {
        if !self.snapshot.is_field_selected(field) {
            return self.snapshot();
        }
        debug!(field, "clear field selection");
        let next = self.snapshot.without(field);
        self.replace(next)
    }

    pub fn clear_all(&mut self) -> SelectionSnapshot {
        debug!(cleared_fields = self.snapshot.len(), "clear all selections");
        self.replace(SelectionSnapshot::empty())
    }

    /// Fields with a non-empty selection, first-selected first.
    pub fn active_fields(&self) -> Vec<FieldName> {
        self.snapshot.field_names().cloned().collect()
    }

    /// One chip per active field, as shown in a selection bar.
    ///
    /// A single selected value is shown as-is; several values are shown as
    /// `"<selected> of <distinct values in the field>"`.
    pub fn summary(&self, dataset: &Dataset) -> Vec<SelectionChip> {
        self.snapshot
            .iter()
            .map(|(field, values)| {
                let label = match values.len() {
                    1 => values
                        .iter()
                        .next()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    n => format!(
                        "{n} of {}",
                        dataset.distinct_values(field.as_str()).len().max(n)
                    ),
                };
                SelectionChip {
                    field: field.clone(),
                    selected: values.len(),
                    label,
                }
            })
            .collect()
    }

    fn replace(&mut self, next: SelectionSnapshot) -> SelectionSnapshot {
        self.snapshot = next;
        self.snapshot()
    }
}

/// Summary of one field's selection.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SelectionChip {
    pub field: FieldName,
    pub selected: usize,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use dash_model::Row;

    use super::*;

    fn north() -> CellValue {
        CellValue::text("North")
    }

    #[test]
    fn toggle_returns_new_snapshot_without_touching_old() {
        let mut store = SelectionStore::new();
        let first = store.toggle("Region", north());
        let second = store.toggle("Region", CellValue::text("South"));

        assert_eq!(first.get("Region").unwrap().len(), 1);
        assert_eq!(second.get("Region").unwrap().len(), 2);
        assert_eq!(store.snapshot(), second);
    }

    #[test]
    fn clear_field_without_selection_is_reference_equal() {
        let mut store = SelectionStore::new();
        let before = store.toggle("Region", north());
        let after = store.clear_field("Product");
        assert!(after.ptr_eq(&before));
    }

    #[test]
    fn clear_field_removes_only_that_field() {
        let mut store = SelectionStore::new();
        store.toggle("Region", north());
        store.toggle("Product", CellValue::text("A"));
        let snapshot = store.clear_field("Region");
        assert!(!snapshot.is_field_selected("Region"));
        assert!(snapshot.is_field_selected("Product"));
    }

    #[test]
    fn clear_all_returns_empty_snapshot() {
        let mut store = SelectionStore::new();
        store.toggle("Region", north());
        store.toggle("Product", CellValue::text("A"));
        assert!(store.clear_all().is_empty());
        assert!(store.active_fields().is_empty());
    }

    #[test]
    fn active_fields_follow_first_selection() {
        let mut store = SelectionStore::new();
        store.toggle("Product", CellValue::text("A"));
        store.toggle("Region", north());
        store.toggle("Product", CellValue::text("B"));
        assert_eq!(
            store.active_fields(),
            vec![FieldName::from("Product"), FieldName::from("Region")]
        );

        // Clearing and reselecting moves the field to the end.
        store.clear_field("Product");
        store.toggle("Product", CellValue::text("A"));
        assert_eq!(
            store.active_fields(),
            vec![FieldName::from("Region"), FieldName::from("Product")]
        );
    }

    #[test]
    fn select_only_with_no_values_clears() {
        let mut store = SelectionStore::new();
        store.toggle("Region", north());
        let snapshot = store.select_only("Region", Vec::new());
        assert!(snapshot.is_empty());
    }

    #[test]
    fn summary_labels_single_and_multiple_values() {
        let dataset = Dataset::from_rows(vec![
            Row::new().with("Region", "North").with("Product", "A"),
            Row::new().with("Region", "South").with("Product", "B"),
            Row::new().with("Region", "East").with("Product", "B"),
        ]);
        let mut store = SelectionStore::new();
        store.toggle("Region", north());
        store.toggle("Region", CellValue::text("South"));
        store.toggle("Product", CellValue::text("B"));

        let chips = store.summary(&dataset);
        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].label, "2 of 3");
        assert_eq!(chips[1].label, "B");
    }
}
