//! Dashboard documents: widgets grouped into sheets.
//!
//! These types only carry what a dashboard stores. Placement fields (`x`, `y`,
//! `w`, `h`) are kept as opaque numbers; nothing here lays widgets out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::enums::MeasureOp;
use crate::error::ModelError;
use crate::ids::{FieldName, SheetId};

pub const DEFAULT_SHEET_ID: &str = "sheet-1";
pub const DEFAULT_TITLE: &str = "My Application";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Kpi,
    Bar,
    Line,
    Pie,
    Table,
    Filter,
    Text,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Kpi => "kpi",
            WidgetKind::Bar => "bar",
            WidgetKind::Line => "line",
            WidgetKind::Pie => "pie",
            WidgetKind::Table => "table",
            WidgetKind::Filter => "filter",
            WidgetKind::Text => "text",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kpi" => Ok(WidgetKind::Kpi),
            "bar" => Ok(WidgetKind::Bar),
            "line" => Ok(WidgetKind::Line),
            "pie" => Ok(WidgetKind::Pie),
            "table" => Ok(WidgetKind::Table),
            "filter" => Ok(WidgetKind::Filter),
            "text" => Ok(WidgetKind::Text),
            _ => Err(ModelError::UnknownWidgetKind(s.to_string())),
        }
    }
}

/// Data binding of a widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub dimension: FieldName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<FieldName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure_op: Option<MeasureOp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl WidgetConfig {
    pub fn dimension(dimension: impl Into<FieldName>) -> Self {
        Self {
            dimension: dimension.into(),
            measure: None,
            measure_op: None,
            text: None,
        }
    }

    pub fn with_measure(mut self, measure: impl Into<FieldName>, op: MeasureOp) -> Self {
        self.measure = Some(measure.into());
        self.measure_op = Some(op);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<u32>,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<WidgetConfig>,
}

impl Widget {
    pub fn new(id: impl Into<String>, kind: WidgetKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            x: None,
            y: None,
            w: 4,
            h: 4,
            content: None,
            comment: None,
            config: None,
        }
    }

    pub fn with_config(mut self, config: WidgetConfig) -> Self {
        self.config = Some(config);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub id: SheetId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl Sheet {
    pub fn new(id: impl Into<SheetId>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            title: Some(name.clone()),
            name,
            widgets: Vec::new(),
        }
    }

    /// Title shown on the page, falling back to the sheet name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// A dashboard: a title plus an ordered list of sheets, one of them active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub title: String,
    pub active_sheet: SheetId,
    pub sheets: Vec<Sheet>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            active_sheet: SheetId::from(DEFAULT_SHEET_ID),
            sheets: vec![default_sheet()],
        }
    }
}

impl Dashboard {
    /// Repair a loaded dashboard so every invariant holds:
    /// at least one sheet exists, every sheet has a title, and the active
    /// sheet id points at an existing sheet.
    pub fn normalize(&mut self) {
        if self.sheets.is_empty() {
            self.sheets.push(default_sheet());
        }
        for sheet in &mut self.sheets {
            if sheet.title.as_deref().is_none_or(str::is_empty) {
                sheet.title = Some(sheet.name.clone());
            }
        }
        if !self.sheets.iter().any(|s| s.id == self.active_sheet) {
            self.active_sheet = self.sheets[0].id.clone();
        }
    }

    /// The active sheet, or the first sheet when the active id is stale.
    pub fn active(&self) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.id == self.active_sheet)
            .or_else(|| self.sheets.first())
    }

    pub fn sheet(&self, id: &SheetId) -> Option<&Sheet> {
        self.sheets.iter().find(|s| &s.id == id)
    }

    /// First `sheet-N` id not already in use.
    pub fn next_sheet_id(&self) -> SheetId {
        (1..)
            .map(|n| SheetId::new(format!("sheet-{n}")))
            .find(|id| self.sheet(id).is_none())
            .unwrap_or_else(|| SheetId::new(format!("sheet-{}", self.sheets.len() + 1)))
    }

    /// Append a new empty sheet named after its position and activate it.
    pub fn add_sheet(&mut self) -> SheetId {
        let id = self.next_sheet_id();
        let name = format!("Sheet {}", self.sheets.len() + 1);
        self.sheets.push(Sheet::new(id.clone(), name));
        self.active_sheet = id.clone();
        id
    }

    /// Remove a sheet. The last remaining sheet cannot be removed.
    ///
    /// Returns whether a sheet was removed.
    pub fn remove_sheet(&mut self, id: &SheetId) -> bool {
        if self.sheets.len() <= 1 {
            return false;
        }
        let before = self.sheets.len();
        self.sheets.retain(|s| &s.id != id);
        if self.sheets.len() == before {
            return false;
        }
        if &self.active_sheet == id {
            self.active_sheet = self.sheets[0].id.clone();
        }
        true
    }

    pub fn rename_sheet(&mut self, id: &SheetId, name: impl Into<String>) -> bool {
        match self.sheets.iter_mut().find(|s| &s.id == id) {
            Some(sheet) => {
                sheet.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_sheet_title(&mut self, id: &SheetId, title: impl Into<String>) -> bool {
        match self.sheets.iter_mut().find(|s| &s.id == id) {
            Some(sheet) => {
                sheet.title = Some(title.into());
                true
            }
            None => false,
        }
    }

    pub fn set_active(&mut self, id: &SheetId) -> bool {
        if self.sheet(id).is_some() {
            self.active_sheet = id.clone();
            true
        } else {
            false
        }
    }
}

/// Sheet used when nothing has been stored yet.
pub fn default_sheet() -> Sheet {
    Sheet::new(DEFAULT_SHEET_ID, "Sheet 1")
}
