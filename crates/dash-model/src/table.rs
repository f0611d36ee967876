use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::ids::FieldName;
use crate::metadata::{FieldKind, FieldMetadata};
use crate::value::CellValue;

static MISSING: CellValue = CellValue::Missing;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: BTreeMap<FieldName, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert used by fixtures and loaders.
    pub fn with(mut self, field: impl Into<FieldName>, value: impl Into<CellValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<FieldName>, value: impl Into<CellValue>) {
        self.cells.insert(field.into(), value.into());
    }

    /// Value of `field`, or [`CellValue::Missing`] when the row lacks it.
    pub fn get(&self, field: &str) -> &CellValue {
        self.cells.get(field).unwrap_or(&MISSING)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &FieldName> {
        self.cells.keys()
    }

    pub fn cells(&self) -> impl Iterator<Item = (&FieldName, &CellValue)> {
        self.cells.iter()
    }
}

impl<F, V> FromIterator<(F, V)> for Row
where
    F: Into<FieldName>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (F, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (field, value) in iter {
            row.insert(field, value);
        }
        row
    }
}

/// An immutable, ordered set of rows plus field metadata.
///
/// The dataset is built once per session and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dataset {
    fields: Vec<FieldMetadata>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(fields: Vec<FieldMetadata>, rows: Vec<Row>) -> Self {
        Self { fields, rows }
    }

    /// Build a dataset and infer field metadata from the rows.
    ///
    /// Fields are listed in the order they are first seen.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let fields = infer_fields(&rows);
        Self { fields, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.name.as_str() == name)
    }

    /// Kind of `name`, defaulting to string for unknown fields.
    pub fn field_kind(&self, name: &str) -> FieldKind {
        self.field(name).map(|f| f.kind).unwrap_or_default()
    }

    /// Distinct values of `field` across every row, in canonical order.
    ///
    /// Rows lacking the field contribute [`CellValue::Missing`].
    pub fn distinct_values(&self, field: &str) -> BTreeSet<CellValue> {
        self.rows.iter().map(|row| row.get(field).clone()).collect()
    }

    /// Turn user input into the cell it names in `field`.
    ///
    /// Values already present in the field are matched by their display
    /// string, so a number in a mixed field is found even though the field
    /// is typed as string. When several cells display alike, the one of the
    /// field's declared kind wins. Input matching no cell is parsed by kind.
    pub fn resolve_value(&self, field: &str, raw: &str) -> CellValue {
        let parsed = CellValue::parse_as(self.field_kind(field), raw);
        let mut candidates = self
            .distinct_values(field)
            .into_iter()
            .filter(|value| value.to_string() == raw);
        match candidates.next() {
            None => parsed,
            Some(first) if first == parsed => first,
            Some(first) => candidates.find(|value| *value == parsed).unwrap_or(first),
        }
    }
}

fn infer_fields(rows: &[Row]) -> Vec<FieldMetadata> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for row in rows {
        for name in row.field_names() {
            if seen.insert(name.clone()) {
                names.push(name.clone());
            }
        }
    }
    names
        .into_iter()
        .map(|name| {
            let kind = FieldKind::infer(rows.iter().map(|row| row.get(name.as_str())));
            FieldMetadata::new(name, kind)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_reads_as_missing() {
        let row = Row::new().with("Region", "North");
        assert_eq!(row.get("Region"), &CellValue::text("North"));
        assert_eq!(row.get("Sales"), &CellValue::Missing);
    }

    #[test]
    fn from_rows_infers_metadata() {
        let dataset = Dataset::from_rows(vec![
            Row::new().with("Region", "North").with("Sales", 100.0),
            Row::new().with("Region", "South"),
        ]);
        assert_eq!(dataset.fields().len(), 2);
        assert_eq!(dataset.field_kind("Sales"), FieldKind::Number);
        assert_eq!(dataset.field_kind("Region"), FieldKind::String);
        assert_eq!(dataset.field_kind("Unknown"), FieldKind::String);
    }

    #[test]
    fn distinct_values_include_missing_for_sparse_rows() {
        let dataset = Dataset::from_rows(vec![
            Row::new().with("Sales", 100.0),
            Row::new().with("Region", "South"),
        ]);
        let values: Vec<_> = dataset.distinct_values("Sales").into_iter().collect();
        assert_eq!(values, vec![CellValue::Missing, CellValue::number(100.0)]);
    }

    #[test]
    fn resolve_value_prefers_cells_present_in_the_field() {
        let dataset = Dataset::from_rows(vec![
            Row::new().with("Qty", 10.0).with("Region", "North"),
            Row::new().with("Qty", "n/a").with("Region", "South"),
            Row::new().with("Qty", "10").with("Region", "West"),
        ]);
        assert_eq!(dataset.field_kind("Qty"), FieldKind::String);

        // "10" is held both as text and as a number; the declared kind wins.
        assert_eq!(dataset.resolve_value("Qty", "10"), CellValue::text("10"));

        let numbers_only = Dataset::from_rows(vec![
            Row::new().with("Qty", 10.0),
            Row::new().with("Qty", "n/a"),
        ]);
        assert_eq!(numbers_only.resolve_value("Qty", "10"), CellValue::number(10.0));
        assert_eq!(numbers_only.resolve_value("Qty", "n/a"), CellValue::text("n/a"));
        assert_eq!(numbers_only.resolve_value("Qty", "12"), CellValue::text("12"));
        assert_eq!(numbers_only.resolve_value("Qty", ""), CellValue::Missing);
        assert_eq!(
            numbers_only.resolve_value("Unknown", "North"),
            CellValue::text("North")
        );
    }
}
