//! Field metadata and kind inference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ids::FieldName;
use crate::value::CellValue;

/// Inferred type of a dataset field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    String,
    Number,
    Date,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
        }
    }

    /// Infer a kind from the cells observed for a field.
    ///
    /// Missing cells are ignored. A field is numeric (or date) only when every
    /// present cell is; a field with no present cell is a string field.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let mut inferred: Option<FieldKind> = None;
        for cell in cells {
            let Some(kind) = cell.kind() else {
                continue;
            };
            match inferred {
                None => inferred = Some(kind),
                Some(current) if current == kind => {}
                Some(_) => return FieldKind::String,
            }
        }
        inferred.unwrap_or_default()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" | "text" => Ok(FieldKind::String),
            "number" | "numeric" => Ok(FieldKind::Number),
            "date" => Ok(FieldKind::Date),
            _ => Err(ModelError::UnknownFieldKind(s.to_string())),
        }
    }
}

/// Name and type of a dataset field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub name: FieldName,
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

impl FieldMetadata {
    pub fn new(name: impl Into<FieldName>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Measures are the fields used for numeric aggregation.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, FieldKind::Number)
    }
}
