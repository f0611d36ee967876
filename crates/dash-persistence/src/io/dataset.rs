//! Dataset loading from JSON documents.
//!
//! Two shapes are accepted:
//!
//! - `{ "fields": [{ "name": "Region", "type": "string" }, ...], "data": [ {...}, ... ] }`
//! - a bare array of row objects, in which case field types are inferred.
//!
//! Cell conversion: JSON numbers become numbers, strings become text (or a
//! date when the field is date-typed and the string is `YYYY-MM-DD`), `null`
//! is a missing cell, booleans become `"true"`/`"false"` text. An undeclared
//! field whose present values are all `YYYY-MM-DD` strings is a date field.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use dash_model::{CellValue, Dataset, FieldKind, FieldMetadata, FieldName, Row, parse_date};
use serde_json::{Map, Value};

use crate::error::{DatasetError, PersistenceError, Result};

/// Read and parse a dataset file.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let bytes = fs::read(path).map_err(|e| PersistenceError::io("read", path, e))?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| PersistenceError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("not valid JSON: {e}"),
        })?;
    let dataset = parse_dataset(value).map_err(|e| PersistenceError::InvalidFormat {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tracing::info!(
        rows = dataset.len(),
        fields = dataset.fields().len(),
        "Loaded dataset from {}",
        path.display()
    );
    Ok(dataset)
}

/// Build a dataset from an already parsed JSON document.
pub fn parse_dataset(document: Value) -> std::result::Result<Dataset, DatasetError> {
    let (declared, data) = match document {
        Value::Array(rows) => (Vec::new(), rows),
        Value::Object(mut object) => {
            let declared = match object.remove("fields") {
                Some(Value::Array(fields)) => parse_fields(&fields)?,
                Some(Value::Null) | None => Vec::new(),
                Some(_) => return Err(DatasetError::FieldsNotArray),
            };
            let data = match object.remove("data") {
                Some(Value::Array(rows)) => rows,
                Some(_) => return Err(DatasetError::DataNotArray),
                None => return Err(DatasetError::MissingData),
            };
            (declared, data)
        }
        _ => return Err(DatasetError::UnexpectedShape),
    };

    let date_fields = undeclared_date_fields(&data, &declared);
    let kind_of = |name: &str| match declared.iter().find(|f| f.name.as_str() == name) {
        Some(field) => field.kind,
        None if date_fields.contains(name) => FieldKind::Date,
        None => FieldKind::String,
    };

    let rows = data
        .into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Object(cells) => Ok(parse_row(cells, &kind_of)),
            other => Err(DatasetError::RowNotObject {
                index,
                found: other.to_string(),
            }),
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if declared.is_empty() {
        return Ok(Dataset::from_rows(rows));
    }

    // Fields present in rows but not declared are appended with an inferred kind.
    let inferred = Dataset::from_rows(rows.clone());
    let known: HashSet<FieldName> = declared.iter().map(|f| f.name.clone()).collect();
    let mut fields = declared;
    fields.extend(
        inferred
            .fields()
            .iter()
            .filter(|f| !known.contains(&f.name))
            .cloned(),
    );
    Ok(Dataset::new(fields, rows))
}

fn parse_fields(fields: &[Value]) -> std::result::Result<Vec<FieldMetadata>, DatasetError> {
    fields
        .iter()
        .map(|field| {
            let name = field
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| DatasetError::UnnamedField(field.to_string()))?;
            let kind = match field.get("type").and_then(Value::as_str) {
                Some(raw) => raw.parse().unwrap_or_else(|_| {
                    tracing::warn!(field = name, kind = raw, "Unknown field type, using string");
                    FieldKind::String
                }),
                None => FieldKind::String,
            };
            Ok(FieldMetadata::new(name, kind))
        })
        .collect()
}

/// Undeclared fields whose every present value is a date string.
fn undeclared_date_fields(rows: &[Value], declared: &[FieldMetadata]) -> HashSet<String> {
    let mut all_dates: HashMap<&str, bool> = HashMap::new();
    for cells in rows.iter().filter_map(Value::as_object) {
        for (name, value) in cells {
            if declared.iter().any(|f| f.name.as_str() == name) {
                continue;
            }
            let is_date = match value {
                Value::Null => continue,
                Value::String(text) => parse_date(text).is_some(),
                _ => false,
            };
            *all_dates.entry(name.as_str()).or_insert(true) &= is_date;
        }
    }
    all_dates
        .into_iter()
        .filter(|(_, dates)| *dates)
        .map(|(name, _)| name.to_string())
        .collect()
}

fn parse_row(cells: Map<String, Value>, kind_of: &impl Fn(&str) -> FieldKind) -> Row {
    cells
        .into_iter()
        .map(|(name, value)| {
            let cell = parse_cell(kind_of(&name), value);
            (name, cell)
        })
        .collect()
}

fn parse_cell(kind: FieldKind, value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Missing,
        Value::Number(number) => number
            .as_f64()
            .map_or(CellValue::Missing, CellValue::number),
        Value::String(text) if kind == FieldKind::Date => {
            parse_date(&text).map_or_else(|| CellValue::Text(text), CellValue::Date)
        }
        Value::String(text) => CellValue::Text(text),
        Value::Bool(flag) => CellValue::text(flag.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => CellValue::text(nested.to_string()),
    }
}

/// Small built-in dataset used when no dataset file is given.
pub fn demo_dataset() -> Dataset {
    Dataset::new(
        vec![
            FieldMetadata::new("Region", FieldKind::String),
            FieldMetadata::new("Product", FieldKind::String),
            FieldMetadata::new("Sales", FieldKind::Number),
        ],
        vec![
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
        ],
    )
}
