//! Dataset and session state shared by every subcommand.

use anyhow::{Context, Result, bail};
use dash_engine::SelectionStore;
use dash_model::{Dashboard, Dataset, SelectionSnapshot, parse_selection_arg};
use dash_persistence::{
    JsonFileStore, SelectionPersistence, StoredSelections, dataset_fingerprint, demo_dataset,
    fingerprint_bytes, load_dashboard, load_dataset, save_dashboard,
};
use tracing::debug;

use crate::cli::DataArgs;

/// The dataset being explored plus the optional session store.
pub struct Session {
    pub dataset: Dataset,
    pub fingerprint: String,
    pub selection: SelectionStore,
    store: Option<JsonFileStore>,
}

impl Session {
    /// Load the dataset (or the demo) and restore the stored selection.
    pub fn open(args: &DataArgs) -> Result<Self> {
        let (dataset, fingerprint) = match &args.dataset {
            Some(path) => {
                let dataset = load_dataset(path)
                    .with_context(|| format!("load dataset {}", path.display()))?;
                let fingerprint = dataset_fingerprint(path)
                    .with_context(|| format!("fingerprint dataset {}", path.display()))?;
                (dataset, fingerprint)
            }
            None => {
                let dataset = demo_dataset();
                let bytes = serde_json::to_vec(&dataset).context("encode demo dataset")?;
                (dataset, fingerprint_bytes(&bytes))
            }
        };

        let mut store = match &args.store {
            Some(path) => Some(
                JsonFileStore::open(path)
                    .with_context(|| format!("open store {}", path.display()))?,
            ),
            None => None,
        };
        let snapshot = match store.as_mut() {
            Some(store) => StoredSelections::new(store)
                .with_fingerprint(fingerprint.clone())
                .load()
                .context("load selection")?,
            None => SelectionSnapshot::empty(),
        };
        debug!(
            rows = dataset.len(),
            fields = dataset.fields().len(),
            restored_fields = snapshot.len(),
            "opened session"
        );

        Ok(Self {
            dataset,
            fingerprint,
            selection: SelectionStore::from_snapshot(snapshot),
            store,
        })
    }

    /// Toggle each `FIELD=VALUE` argument, in order.
    pub fn apply_selects(&mut self, selects: &[String]) -> Result<SelectionSnapshot> {
        for raw in selects {
            let (field, value) =
                parse_selection_arg(raw, |name, value| self.dataset.resolve_value(name, value))?;
            self.selection.toggle(field, value);
        }
        Ok(self.selection.snapshot())
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    fn store_mut(&mut self) -> Result<&mut JsonFileStore> {
        match self.store.as_mut() {
            Some(store) => Ok(store),
            None => bail!("this command needs a session store; pass --store <PATH>"),
        }
    }

    /// Persist the current selection.
    pub fn save_selection(&mut self) -> Result<()> {
        let snapshot = self.selection.snapshot();
        let fingerprint = self.fingerprint.clone();
        let store = self.store_mut()?;
        StoredSelections::new(store)
            .with_fingerprint(fingerprint)
            .save(&snapshot)
            .context("save selection")
    }

    /// The stored dashboard, or the default one without a store.
    pub fn dashboard(&self) -> Result<Dashboard> {
        match &self.store {
            Some(store) => load_dashboard(store).context("load dashboard"),
            None => Ok(Dashboard::default()),
        }
    }

    pub fn save_dashboard(&mut self, dashboard: &Dashboard) -> Result<()> {
        let store = self.store_mut()?;
        save_dashboard(store, dashboard).context("save dashboard")
    }
}
