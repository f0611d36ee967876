//! Tagged cell values.
//!
//! Every cell of a [`crate::Row`] is one of four variants. The derived
//! ordering is the canonical comparator used for filter panes:
//!
//! `Missing < Number < Date < Text`
//!
//! Numbers compare numerically (total order, NaN sorts last among numbers),
//! dates chronologically, and text lexicographically by byte.

use std::fmt;

use chrono::NaiveDate;
use ordered_float::OrderedFloat;

use crate::metadata::FieldKind;

/// ISO calendar date format used for date cells.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Missing,
    Number(OrderedFloat<f64>),
    Date(NaiveDate),
    Text(String),
}

impl CellValue {
    pub fn number(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn date(value: NaiveDate) -> Self {
        Self::Date(value)
    }

    /// Parse a raw string into a cell of the given field kind.
    ///
    /// Strings that do not fit the requested kind fall back to text so that no
    /// input is ever rejected; an empty string is a missing cell.
    pub fn parse_as(kind: FieldKind, raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Missing;
        }
        match kind {
            FieldKind::Number => raw
                .trim()
                .parse::<f64>()
                .map_or_else(|_| Self::text(raw), Self::number),
            FieldKind::Date => parse_date(raw).map_or_else(|| Self::text(raw), Self::Date),
            FieldKind::String => Self::text(raw),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Coerce the cell into a measure value.
    ///
    /// Numbers pass through, numeric text is parsed, everything else
    /// (including NaN) counts as zero.
    pub fn to_measure(&self) -> f64 {
        let value = match self {
            Self::Number(value) => value.into_inner(),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(0.0)
                }
            }
            Self::Date(_) | Self::Missing => 0.0,
        };
        if value.is_nan() { 0.0 } else { value }
    }

    /// Field kind this cell belongs to, `None` for missing cells.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            Self::Missing => None,
            Self::Number(_) => Some(FieldKind::Number),
            Self::Date(_) => Some(FieldKind::Date),
            Self::Text(_) => Some(FieldKind::String),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Number(value) => write!(f, "{}", value.into_inner()),
            Self::Date(value) => write!(f, "{}", value.format(DATE_FORMAT)),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_groups_by_kind() {
        let mut values = vec![
            CellValue::text("b"),
            CellValue::number(10.0),
            CellValue::Missing,
            CellValue::date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            CellValue::number(2.0),
            CellValue::text("A"),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CellValue::Missing,
                CellValue::number(2.0),
                CellValue::number(10.0),
                CellValue::date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
                CellValue::text("A"),
                CellValue::text("b"),
            ]
        );
    }

    #[test]
    fn measure_coercion_is_lenient() {
        assert_eq!(CellValue::number(12.5).to_measure(), 12.5);
        assert_eq!(CellValue::text(" 7 ").to_measure(), 7.0);
        assert_eq!(CellValue::text("north").to_measure(), 0.0);
        assert_eq!(CellValue::Missing.to_measure(), 0.0);
        assert_eq!(CellValue::number(f64::NAN).to_measure(), 0.0);
    }

    #[test]
    fn parse_as_falls_back_to_text() {
        assert_eq!(
            CellValue::parse_as(FieldKind::Number, "150"),
            CellValue::number(150.0)
        );
        assert_eq!(
            CellValue::parse_as(FieldKind::Number, "n/a"),
            CellValue::text("n/a")
        );
        assert_eq!(
            CellValue::parse_as(FieldKind::Date, "2024-03-01"),
            CellValue::date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(CellValue::parse_as(FieldKind::String, ""), CellValue::Missing);
    }

    #[test]
    fn display_drops_integral_fraction() {
        assert_eq!(CellValue::number(100.0).to_string(), "100");
        assert_eq!(CellValue::number(1.25).to_string(), "1.25");
        assert_eq!(
            CellValue::date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).to_string(),
            "2024-03-01"
        );
        assert_eq!(CellValue::Missing.to_string(), "");
    }
}
