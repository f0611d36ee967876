//! Persisting the active selection between sessions.

use dash_model::SelectionSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{KeyValueStore, get_as, set_as};

/// Key the selection is stored under.
pub const SELECTIONS_KEY: &str = "selections";

/// Loads and saves selection snapshots.
pub trait SelectionPersistence {
    /// The stored snapshot, or an empty one when nothing usable is stored.
    fn load(&self) -> Result<SelectionSnapshot>;

    fn save(&mut self, snapshot: &SelectionSnapshot) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
    snapshot: SelectionSnapshot,
}

/// Selection persistence on top of any [`KeyValueStore`].
///
/// When a dataset fingerprint is set, it is saved alongside the snapshot and
/// a snapshot saved against a different dataset is discarded on load.
#[derive(Debug, Clone)]
pub struct StoredSelections<S> {
    store: S,
    fingerprint: Option<String>,
}

impl<S: KeyValueStore> StoredSelections<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            fingerprint: None,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Drop the stored selection.
    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(SELECTIONS_KEY)
    }
}

impl<S: KeyValueStore> SelectionPersistence for StoredSelections<S> {
    fn load(&self) -> Result<SelectionSnapshot> {
        let Some(stored) = get_as::<StoredSnapshot, _>(&self.store, SELECTIONS_KEY)? else {
            return Ok(SelectionSnapshot::empty());
        };
        if let (Some(expected), Some(found)) = (&self.fingerprint, &stored.fingerprint)
            && expected != found
        {
            tracing::warn!(
                expected = %expected,
                found = %found,
                "Stored selection belongs to a different dataset, ignoring it"
            );
            return Ok(SelectionSnapshot::empty());
        }
        tracing::info!(fields = stored.snapshot.len(), "Loaded selection");
        Ok(stored.snapshot)
    }

    fn save(&mut self, snapshot: &SelectionSnapshot) -> Result<()> {
        let stored = StoredSnapshot {
            fingerprint: self.fingerprint.clone(),
            snapshot: snapshot.clone(),
        };
        set_as(&mut self.store, SELECTIONS_KEY, &stored)?;
        tracing::info!(fields = snapshot.len(), "Saved selection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dash_model::{CellValue, FieldName};

    use super::*;
    use crate::store::MemoryStore;

    fn north() -> SelectionSnapshot {
        SelectionSnapshot::empty().toggled(&FieldName::from("Region"), &CellValue::text("North"))
    }

    #[test]
    fn nothing_stored_loads_empty() {
        let selections = StoredSelections::new(MemoryStore::new());
        assert!(selections.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let mut selections = StoredSelections::new(MemoryStore::new());
        selections.save(&north()).unwrap();
        assert_eq!(selections.load().unwrap(), north());

        selections.clear().unwrap();
        assert!(selections.load().unwrap().is_empty());
    }

    #[test]
    fn fingerprint_mismatch_discards_selection() {
        let mut selections = StoredSelections::new(MemoryStore::new()).with_fingerprint("aaa");
        selections.save(&north()).unwrap();
        assert_eq!(selections.load().unwrap(), north());

        let store = selections.into_inner();
        let other = StoredSelections::new(store.clone()).with_fingerprint("bbb");
        assert!(other.load().unwrap().is_empty());

        // Without a fingerprint to compare against, the selection is kept.
        let unchecked = StoredSelections::new(store);
        assert_eq!(unchecked.load().unwrap(), north());
    }

    #[test]
    fn restored_fields_keep_selection_order() {
        let snapshot = SelectionSnapshot::empty()
            .toggled(&FieldName::from("Sales"), &CellValue::number(150.0))
            .toggled(&FieldName::from("Region"), &CellValue::text("North"))
            .toggled(&FieldName::from("Product"), &CellValue::text("B"));
        let mut selections = StoredSelections::new(MemoryStore::new());
        selections.save(&snapshot).unwrap();

        let restored = selections.load().unwrap();
        let fields: Vec<&str> = restored.field_names().map(FieldName::as_str).collect();
        assert_eq!(fields, vec!["Sales", "Region", "Product"]);
    }
}
