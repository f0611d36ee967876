//! Immutable selection snapshots.
//!
//! A [`SelectionSnapshot`] maps field names to the set of values selected in
//! that field. Snapshots are values: every mutation returns a new snapshot and
//! leaves the receiver untouched. The field map and each field's value set sit
//! behind [`Arc`], so producing a new snapshot only copies the set of the field
//! being changed.
//!
//! Invariants:
//! - a field is present only while its value set is non-empty;
//! - fields iterate in the order they were first selected;
//! - equality is by membership and ignores field order.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ids::FieldName;
use crate::table::Row;
use crate::value::CellValue;

/// Values selected within one field.
pub type ValueSet = BTreeSet<CellValue>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SnapshotRepr", into = "SnapshotRepr")]
pub struct SelectionSnapshot {
    fields: Arc<IndexMap<FieldName, Arc<ValueSet>>>,
}

impl SelectionSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no field carries a constraint.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of constrained fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&ValueSet> {
        self.fields.get(field).map(Arc::as_ref)
    }

    pub fn contains(&self, field: &str, value: &CellValue) -> bool {
        self.get(field).is_some_and(|values| values.contains(value))
    }

    pub fn is_field_selected(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Constrained fields and their values, first-selected first.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &ValueSet)> {
        self.fields
            .iter()
            .map(|(field, values)| (field, values.as_ref()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.keys()
    }

    /// Snapshot with `value` added to or removed from `field`.
    pub fn toggled(&self, field: &FieldName, value: &CellValue) -> Self {
        let mut values = self
            .fields
            .get(field)
            .map(|values| ValueSet::clone(values))
            .unwrap_or_default();
        if !values.remove(value) {
            values.insert(value.clone());
        }
        self.with_field_values(field, values)
    }

    /// Snapshot with `field` constrained to exactly `values`.
    ///
    /// An empty `values` removes the field's constraint.
    pub fn with_field(
        &self,
        field: &FieldName,
        values: impl IntoIterator<Item = CellValue>,
    ) -> Self {
        self.with_field_values(field, values.into_iter().collect())
    }

    /// Snapshot without `field`'s constraint.
    ///
    /// Returns a clone sharing the same storage when the field is not
    /// constrained.
    pub fn without(&self, field: &str) -> Self {
        if !self.fields.contains_key(field) {
            return self.clone();
        }
        let mut fields = IndexMap::clone(&self.fields);
        fields.shift_remove(field);
        Self {
            fields: Arc::new(fields),
        }
    }

    /// True when the row satisfies every constraint: AND across fields, OR
    /// within a field's value set.
    pub fn matches(&self, row: &Row) -> bool {
        self.fields
            .iter()
            .all(|(field, values)| values.contains(row.get(field.as_str())))
    }

    /// True when both snapshots share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }

    fn with_field_values(&self, field: &FieldName, values: ValueSet) -> Self {
        let mut fields = IndexMap::clone(&self.fields);
        if values.is_empty() {
            fields.shift_remove(field);
        } else {
            fields.insert(field.clone(), Arc::new(values));
        }
        Self {
            fields: Arc::new(fields),
        }
    }
}

/// Parse a `FIELD=VALUE` argument into a field name and a cell.
///
/// `resolve(field, value)` turns the raw value into the cell it names,
/// usually [`crate::Dataset::resolve_value`].
pub fn parse_selection_arg(
    raw: &str,
    resolve: impl Fn(&str, &str) -> CellValue,
) -> Result<(FieldName, CellValue), ModelError> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| ModelError::InvalidSelection(raw.to_string()))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(ModelError::InvalidSelection(raw.to_string()));
    }
    let value = resolve(field, value);
    Ok((FieldName::from(field), value))
}

/// Stored form of a snapshot: a list of field selections, so that field
/// order survives maps that sort their keys.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct SnapshotRepr(Vec<FieldSelection>);

#[derive(Serialize, Deserialize)]
struct FieldSelection {
    field: FieldName,
    values: Vec<CellValue>,
}

impl From<SnapshotRepr> for SelectionSnapshot {
    fn from(repr: SnapshotRepr) -> Self {
        let mut fields: IndexMap<FieldName, Arc<ValueSet>> = IndexMap::new();
        for FieldSelection { field, values } in repr.0 {
            let values: ValueSet = values.into_iter().collect();
            if values.is_empty() {
                continue;
            }
            match fields.get_mut(&field) {
                Some(existing) => Arc::make_mut(existing).extend(values),
                None => {
                    fields.insert(field, Arc::new(values));
                }
            }
        }
        Self {
            fields: Arc::new(fields),
        }
    }
}

impl From<SelectionSnapshot> for SnapshotRepr {
    fn from(snapshot: SelectionSnapshot) -> Self {
        SnapshotRepr(
            snapshot
                .iter()
                .map(|(field, values)| FieldSelection {
                    field: field.clone(),
                    values: values.iter().cloned().collect(),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FieldKind;

    fn field(name: &str) -> FieldName {
        FieldName::from(name)
    }

    #[test]
    fn toggle_adds_then_removes() {
        let empty = SelectionSnapshot::empty();
        let once = empty.toggled(&field("Region"), &CellValue::text("North"));
        assert!(once.contains("Region", &CellValue::text("North")));
        assert!(empty.is_empty());

        let twice = once.toggled(&field("Region"), &CellValue::text("North"));
        assert!(twice.is_empty());
        assert!(!twice.is_field_selected("Region"));
        assert!(once.contains("Region", &CellValue::text("North")));
    }

    #[test]
    fn untouched_fields_share_storage() {
        let a = SelectionSnapshot::empty()
            .toggled(&field("Region"), &CellValue::text("North"))
            .toggled(&field("Product"), &CellValue::text("A"));
        let b = a.toggled(&field("Product"), &CellValue::text("B"));
        let region_a = a.fields.get("Region").unwrap();
        let region_b = b.fields.get("Region").unwrap();
        assert!(Arc::ptr_eq(region_a, region_b));
    }

    #[test]
    fn field_order_is_first_selected_first() {
        let snapshot = SelectionSnapshot::empty()
            .toggled(&field("Product"), &CellValue::text("A"))
            .toggled(&field("Region"), &CellValue::text("North"))
            .toggled(&field("Product"), &CellValue::text("B"));
        let names: Vec<&str> = snapshot.field_names().map(FieldName::as_str).collect();
        assert_eq!(names, vec!["Product", "Region"]);
    }

    #[test]
    fn equality_ignores_field_order() {
        let a = SelectionSnapshot::empty()
            .toggled(&field("Product"), &CellValue::text("A"))
            .toggled(&field("Region"), &CellValue::text("North"));
        let b = SelectionSnapshot::empty()
            .toggled(&field("Region"), &CellValue::text("North"))
            .toggled(&field("Product"), &CellValue::text("A"));
        assert_eq!(a, b);
    }

    #[test]
    fn without_unselected_field_is_reference_equal() {
        let a = SelectionSnapshot::empty().toggled(&field("Region"), &CellValue::text("North"));
        assert!(a.without("Product").ptr_eq(&a));
        assert!(a.without("Region").is_empty());
    }

    #[test]
    fn matches_is_and_across_fields_or_within() {
        let snapshot = SelectionSnapshot::empty()
            .with_field(
                &field("Region"),
                [CellValue::text("North"), CellValue::text("South")],
            )
            .with_field(&field("Product"), [CellValue::text("A")]);
        let north_a = Row::new().with("Region", "North").with("Product", "A");
        let south_a = Row::new().with("Region", "South").with("Product", "A");
        let north_b = Row::new().with("Region", "North").with("Product", "B");
        assert!(snapshot.matches(&north_a));
        assert!(snapshot.matches(&south_a));
        assert!(!snapshot.matches(&north_b));
    }

    #[test]
    fn serde_drops_empty_sets() {
        let json = r#"[
            {"field": "Region", "values": [{"kind": "Text", "value": "North"}]},
            {"field": "Product", "values": []}
        ]"#;
        let snapshot: SelectionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains("Region", &CellValue::text("North")));

        let back = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            back,
            r#"[{"field":"Region","values":[{"kind":"Text","value":"North"}]}]"#
        );
    }

    #[test]
    fn field_order_survives_a_json_value() {
        let snapshot = SelectionSnapshot::empty()
            .toggled(&field("Region"), &CellValue::text("North"))
            .toggled(&field("Product"), &CellValue::text("A"))
            .toggled(&field("Date"), &CellValue::text("2024"));
        let value = serde_json::to_value(&snapshot).unwrap();
        let restored: SelectionSnapshot = serde_json::from_value(value).unwrap();
        let names: Vec<&str> = restored.field_names().map(FieldName::as_str).collect();
        assert_eq!(names, vec!["Region", "Product", "Date"]);
    }

    #[test]
    fn parse_selection_arg_splits_on_first_equals() {
        let resolve = |f: &str, raw: &str| {
            let kind = if f == "Sales" {
                FieldKind::Number
            } else {
                FieldKind::String
            };
            CellValue::parse_as(kind, raw)
        };
        let (name, value) = parse_selection_arg("Sales=150", resolve).unwrap();
        assert_eq!(name.as_str(), "Sales");
        assert_eq!(value, CellValue::number(150.0));

        let (_, value) = parse_selection_arg("Region=North=East", resolve).unwrap();
        assert_eq!(value, CellValue::text("North=East"));

        assert!(parse_selection_arg("Region", resolve).is_err());
        assert!(parse_selection_arg("=North", resolve).is_err());
    }
}
