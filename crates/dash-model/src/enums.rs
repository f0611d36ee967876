//! Type-safe enumerations shared by the engine and its consumers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Associative state of one distinct value of a field.
///
/// - **Selected**: the value is in its own field's selection.
/// - **Possible**: not selected, but some row carries it and satisfies every
///   other field's selection.
/// - **Excluded**: no row carrying the value satisfies the other selections.
/// - **Alternative**: would be possible, but its field already has a
///   selection. Only reported when alternatives are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueState {
    Selected,
    Possible,
    Excluded,
    Alternative,
}

impl ValueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueState::Selected => "SELECTED",
            ValueState::Possible => "POSSIBLE",
            ValueState::Excluded => "EXCLUDED",
            ValueState::Alternative => "ALTERNATIVE",
        }
    }
}

impl fmt::Display for ValueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueState {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SELECTED" => Ok(ValueState::Selected),
            "POSSIBLE" => Ok(ValueState::Possible),
            "EXCLUDED" => Ok(ValueState::Excluded),
            "ALTERNATIVE" => Ok(ValueState::Alternative),
            _ => Err(ModelError::UnknownValueState(s.to_string())),
        }
    }
}

/// Reduction applied to a measure within each group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureOp {
    #[default]
    Sum,
    Avg,
    Count,
}

impl MeasureOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureOp::Sum => "sum",
            MeasureOp::Avg => "avg",
            MeasureOp::Count => "count",
        }
    }

    /// Label shown next to a KPI value.
    pub fn kpi_label(&self) -> &'static str {
        match self {
            MeasureOp::Sum => "Total",
            MeasureOp::Avg => "Average",
            MeasureOp::Count => "Count",
        }
    }
}

impl fmt::Display for MeasureOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasureOp {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(MeasureOp::Sum),
            "avg" | "average" | "mean" => Ok(MeasureOp::Avg),
            "count" => Ok(MeasureOp::Count),
            _ => Err(ModelError::UnknownMeasureOp(s.to_string())),
        }
    }
}
