//! Associative classification of field values.
//!
//! For a field `F`, the rows that decide which of `F`'s values are still
//! reachable are the rows satisfying every selection *except* `F`'s own:
//! selecting a value in `F` must never exclude its siblings in `F`. Across
//! fields selections combine with AND, within a field with OR.
//!
//! All functions here are pure over `(dataset, snapshot)`.

use std::collections::{HashMap, HashSet};

use dash_model::{
    CellValue, Dataset, FieldName, Row, SelectionSnapshot, ValueSet, ValueState,
};
use serde::Serialize;
use tracing::{debug, debug_span};

/// One distinct value of a field and its associative state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedValue {
    pub value: CellValue,
    pub state: ValueState,
}

/// Classification of every distinct value of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldClassification {
    pub field: FieldName,
    pub values: Vec<ClassifiedValue>,
}

impl FieldClassification {
    pub fn count(&self, state: ValueState) -> usize {
        self.values.iter().filter(|v| v.state == state).count()
    }

    pub fn state_of(&self, value: &CellValue) -> Option<ValueState> {
        self.values
            .iter()
            .find(|v| &v.value == value)
            .map(|v| v.state)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Report [`ValueState::Alternative`] for values that are reachable under
    /// the other fields' selections while their own field has a selection.
    /// Off by default, in which case such values are [`ValueState::Possible`].
    pub alternatives: bool,
}

/// Classify every distinct value of `field` as selected, possible or excluded.
///
/// Values are returned in canonical [`CellValue`] order.
pub fn classify_field(
    field: &str,
    dataset: &Dataset,
    snapshot: &SelectionSnapshot,
) -> Vec<ClassifiedValue> {
    classify_field_with(field, dataset, snapshot, ClassifyOptions::default())
}

pub fn classify_field_with(
    field: &str,
    dataset: &Dataset,
    snapshot: &SelectionSnapshot,
    options: ClassifyOptions,
) -> Vec<ClassifiedValue> {
    let rows = possible_rows_excluding(field, dataset, snapshot);
    classify_against(field, dataset, snapshot.get(field), &rows, options)
}

/// Rows compatible with every selection in `snapshot`.
pub fn possible_rows<'a>(dataset: &'a Dataset, snapshot: &SelectionSnapshot) -> Vec<&'a Row> {
    if snapshot.is_empty() {
        return dataset.rows().iter().collect();
    }
    dataset
        .rows()
        .iter()
        .filter(|row| snapshot.matches(row))
        .collect()
}

/// Rows compatible with every selection except `field`'s own.
pub fn possible_rows_excluding<'a>(
    field: &str,
    dataset: &'a Dataset,
    snapshot: &SelectionSnapshot,
) -> Vec<&'a Row> {
    possible_rows(dataset, &snapshot.without(field))
}

fn classify_against(
    field: &str,
    dataset: &Dataset,
    own_selection: Option<&ValueSet>,
    possible: &[&Row],
    options: ClassifyOptions,
) -> Vec<ClassifiedValue> {
    let possible_values: HashSet<&CellValue> = possible.iter().map(|row| row.get(field)).collect();
    let has_own_selection = own_selection.is_some_and(|values| !values.is_empty());

    dataset
        .distinct_values(field)
        .into_iter()
        .map(|value| {
            let state = if own_selection.is_some_and(|values| values.contains(&value)) {
                ValueState::Selected
            } else if possible_values.contains(&value) {
                if options.alternatives && has_own_selection {
                    ValueState::Alternative
                } else {
                    ValueState::Possible
                }
            } else {
                ValueState::Excluded
            };
            ClassifiedValue { value, state }
        })
        .collect()
}

/// Evaluates many filter panes against one snapshot.
///
/// Every field without a selection of its own shares the same constraint set
/// (the whole snapshot), so its possible rows are computed once per pass and
/// reused. Fields with their own selection each get their own row set.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    dataset: &'a Dataset,
    snapshot: SelectionSnapshot,
    options: ClassifyOptions,
}

impl<'a> Evaluator<'a> {
    pub fn new(dataset: &'a Dataset, snapshot: SelectionSnapshot) -> Self {
        Self {
            dataset,
            snapshot,
            options: ClassifyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ClassifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn snapshot(&self) -> &SelectionSnapshot {
        &self.snapshot
    }

    /// Rows compatible with every active selection.
    pub fn possible_rows(&self) -> Vec<&'a Row> {
        possible_rows(self.dataset, &self.snapshot)
    }

    pub fn classify(&self, field: &str) -> FieldClassification {
        FieldClassification {
            field: FieldName::from(field),
            values: classify_field_with(field, self.dataset, &self.snapshot, self.options),
        }
    }

    /// Classify several fields, sharing row filtering between them.
    pub fn classify_fields<I>(&self, fields: I) -> Vec<FieldClassification>
    where
        I: IntoIterator,
        I::Item: Into<FieldName>,
    {
        let span = debug_span!(
            "classify_fields",
            rows = self.dataset.len(),
            constrained_fields = self.snapshot.len()
        );
        let _guard = span.enter();

        let mut shared: Option<Vec<&'a Row>> = None;
        let mut own: HashMap<FieldName, Vec<&'a Row>> = HashMap::new();
        let mut out = Vec::new();

        for field in fields {
            let field: FieldName = field.into();
            let rows = if self.snapshot.is_field_selected(field.as_str()) {
                own.entry(field.clone()).or_insert_with(|| {
                    possible_rows_excluding(field.as_str(), self.dataset, &self.snapshot)
                })
            } else {
                shared.get_or_insert_with(|| self.possible_rows())
            };
            let values = classify_against(
                field.as_str(),
                self.dataset,
                self.snapshot.get(field.as_str()),
                rows,
                self.options,
            );
            out.push(FieldClassification { field, values });
        }

        debug!(
            fields = out.len(),
            row_sets = own.len() + usize::from(shared.is_some()),
            "classified fields"
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use dash_model::{FieldKind, FieldMetadata};

    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_rows(vec![
            Row::new()
                .with("Region", "North")
                .with("Product", "A")
                .with("Sales", 100.0),
            Row::new()
                .with("Region", "South")
                .with("Product", "B")
                .with("Sales", 200.0),
            Row::new()
                .with("Region", "North")
                .with("Product", "B")
                .with("Sales", 150.0),
        ])
    }

    fn select(snapshot: &SelectionSnapshot, field: &str, value: &str) -> SelectionSnapshot {
        snapshot.toggled(&FieldName::from(field), &CellValue::text(value))
    }

    fn states(values: &[ClassifiedValue]) -> Vec<(String, ValueState)> {
        values
            .iter()
            .map(|v| (v.value.to_string(), v.state))
            .collect()
    }

    #[test]
    fn own_selection_does_not_exclude_siblings() {
        let snapshot = select(&SelectionSnapshot::empty(), "Region", "North");
        let regions = classify_field("Region", &dataset(), &snapshot);
        assert_eq!(
            states(&regions),
            vec![
                ("North".to_string(), ValueState::Selected),
                ("South".to_string(), ValueState::Possible),
            ]
        );
    }

    #[test]
    fn alternatives_are_opt_in() {
        let snapshot = select(&SelectionSnapshot::empty(), "Region", "North");
        let options = ClassifyOptions { alternatives: true };
        let regions = classify_field_with("Region", &dataset(), &snapshot, options);
        assert_eq!(
            states(&regions),
            vec![
                ("North".to_string(), ValueState::Selected),
                ("South".to_string(), ValueState::Alternative),
            ]
        );

        // Fields without their own selection never report alternatives.
        let products = classify_field_with("Product", &dataset(), &snapshot, options);
        assert!(products.iter().all(|v| v.state == ValueState::Possible));
    }

    #[test]
    fn empty_dataset_classifies_to_nothing() {
        let snapshot = select(&SelectionSnapshot::empty(), "Region", "North");
        assert!(classify_field("Region", &Dataset::empty(), &snapshot).is_empty());
        assert!(possible_rows(&Dataset::empty(), &snapshot).is_empty());
    }

    #[test]
    fn selection_on_unknown_field_excludes_everything_else() {
        let snapshot = select(&SelectionSnapshot::empty(), "Color", "Red");
        let regions = classify_field("Region", &dataset(), &snapshot);
        assert!(regions.iter().all(|v| v.state == ValueState::Excluded));
    }

    #[test]
    fn numeric_values_sort_numerically() {
        let dataset = Dataset::new(
            vec![FieldMetadata::new("Qty", FieldKind::Number)],
            vec![
                Row::new().with("Qty", 10.0),
                Row::new().with("Qty", 9.0),
                Row::new().with("Qty", 100.0),
            ],
        );
        let values: Vec<String> = classify_field("Qty", &dataset, &SelectionSnapshot::empty())
            .iter()
            .map(|v| v.value.to_string())
            .collect();
        assert_eq!(values, vec!["9", "10", "100"]);
    }

    #[test]
    fn evaluator_matches_single_field_classification() {
        let dataset = dataset();
        let snapshot = select(&SelectionSnapshot::empty(), "Region", "North");
        let snapshot = select(&snapshot, "Product", "A");
        let evaluator = Evaluator::new(&dataset, snapshot.clone());

        let panes = evaluator.classify_fields(["Region", "Product", "Sales"]);
        for pane in &panes {
            assert_eq!(
                pane.values,
                classify_field(pane.field.as_str(), &dataset, &snapshot),
                "field {}",
                pane.field
            );
        }
        assert_eq!(panes[0].count(ValueState::Excluded), 1);
        assert_eq!(
            panes[2].state_of(&CellValue::number(100.0)),
            Some(ValueState::Possible)
        );
        assert_eq!(
            panes[2].state_of(&CellValue::number(150.0)),
            Some(ValueState::Excluded)
        );
    }
}
