//! Dashboard document storage.
//!
//! A dashboard is spread over three keys: `sheets`, `activeSheet` and
//! `title`. Stores written before sheets existed hold a single `widgets`
//! list, which is migrated into one default sheet on load.

use dash_model::{DEFAULT_SHEET_ID, DEFAULT_TITLE, Dashboard, Sheet, SheetId, Widget, default_sheet};
use serde::de::DeserializeOwned;

use crate::error::{PersistenceError, Result};
use crate::store::{KeyValueStore, get_as, set_as};

pub const SHEETS_KEY: &str = "sheets";
pub const ACTIVE_SHEET_KEY: &str = "activeSheet";
pub const TITLE_KEY: &str = "title";
pub const LEGACY_WIDGETS_KEY: &str = "widgets";

/// Load the dashboard, repairing anything missing or malformed.
///
/// Undecodable entries fall back to their defaults; only store access
/// failures are reported as errors.
pub fn load_dashboard<S: KeyValueStore + ?Sized>(store: &S) -> Result<Dashboard> {
    let sheets = match lenient::<Vec<Sheet>, _>(store, SHEETS_KEY)? {
        Some(sheets) => sheets,
        None => match lenient::<Vec<Widget>, _>(store, LEGACY_WIDGETS_KEY)? {
            Some(widgets) => {
                tracing::warn!(
                    widgets = widgets.len(),
                    "Migrating legacy widget list into the first sheet"
                );
                let mut sheet = default_sheet();
                sheet.widgets = widgets;
                vec![sheet]
            }
            None => vec![default_sheet()],
        },
    };

    let active_sheet = lenient::<String, _>(store, ACTIVE_SHEET_KEY)?
        .filter(|id| !id.is_empty())
        .map_or_else(|| SheetId::from(DEFAULT_SHEET_ID), SheetId::from);
    let title = lenient::<String, _>(store, TITLE_KEY)?
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let mut dashboard = Dashboard {
        title,
        active_sheet,
        sheets,
    };
    dashboard.normalize();
    tracing::info!(
        sheets = dashboard.sheets.len(),
        active = %dashboard.active_sheet,
        "Loaded dashboard"
    );
    Ok(dashboard)
}

/// Write every dashboard key and drop the legacy widget list.
pub fn save_dashboard<S: KeyValueStore + ?Sized>(store: &mut S, dashboard: &Dashboard) -> Result<()> {
    set_as(store, SHEETS_KEY, &dashboard.sheets)?;
    set_as(store, ACTIVE_SHEET_KEY, &dashboard.active_sheet)?;
    set_as(store, TITLE_KEY, &dashboard.title)?;
    store.remove(LEGACY_WIDGETS_KEY)?;
    tracing::info!(sheets = dashboard.sheets.len(), "Saved dashboard");
    Ok(())
}

fn lenient<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match get_as(store, key) {
        Err(PersistenceError::Deserialization { source, .. }) => {
            tracing::warn!(key, error = %source, "Ignoring malformed stored value");
            Ok(None)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use dash_model::WidgetKind;
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn empty_store_yields_default_dashboard() {
        let dashboard = load_dashboard(&MemoryStore::new()).unwrap();
        assert_eq!(dashboard, Dashboard::default());
    }

    #[test]
    fn legacy_widgets_migrate_into_first_sheet() {
        let mut store = MemoryStore::new();
        store
            .set(
                LEGACY_WIDGETS_KEY,
                json!([{"id": "w1", "type": "kpi", "title": "Total", "w": 3, "h": 2}]),
            )
            .unwrap();

        let dashboard = load_dashboard(&store).unwrap();
        assert_eq!(dashboard.sheets.len(), 1);
        assert_eq!(dashboard.sheets[0].id.as_str(), DEFAULT_SHEET_ID);
        assert_eq!(dashboard.sheets[0].widgets[0].kind, WidgetKind::Kpi);

        save_dashboard(&mut store, &dashboard).unwrap();
        assert_eq!(store.get(LEGACY_WIDGETS_KEY).unwrap(), None);
        assert_eq!(load_dashboard(&store).unwrap(), dashboard);
    }

    #[test]
    fn malformed_sheets_fall_back_to_default() {
        let mut store = MemoryStore::new();
        store.set(SHEETS_KEY, json!("oops")).unwrap();
        store.set(TITLE_KEY, json!("Quarterly")).unwrap();

        let dashboard = load_dashboard(&store).unwrap();
        assert_eq!(dashboard.sheets, vec![default_sheet()]);
        assert_eq!(dashboard.title, "Quarterly");
    }

    #[test]
    fn stale_active_sheet_resolves_to_first() {
        let mut store = MemoryStore::new();
        store
            .set(
                SHEETS_KEY,
                json!([{"id": "sheet-9", "name": "Overview", "widgets": []}]),
            )
            .unwrap();
        store.set(ACTIVE_SHEET_KEY, json!("sheet-1")).unwrap();

        let dashboard = load_dashboard(&store).unwrap();
        assert_eq!(dashboard.active_sheet.as_str(), "sheet-9");
        assert_eq!(dashboard.sheets[0].title.as_deref(), Some("Overview"));
    }
}
