//! Persistent storage for the associative dashboard engine.
//!
//! # Features
//!
//! - **Selection persistence** behind the [`SelectionPersistence`] trait,
//!   tied to a dataset fingerprint
//! - **Dashboard documents** with migration of legacy widget lists
//! - **Atomic writes** to prevent store corruption
//! - **Dataset loading** from JSON documents
//!
//! # Store format
//!
//! [`JsonFileStore`] keeps every key in one JSON document:
//!
//! ```text
//! { "schemaVersion": 1, "entries": { "selections": ..., "sheets": ..., ... } }
//! ```
//!
//! # Architecture
//!
//! - `store/` - Key-value stores (in-memory, JSON file)
//! - `io/` - Dataset loading and fingerprinting
//! - `selection.rs` - Selection snapshot persistence
//! - `dashboard.rs` - Dashboard sheets, active sheet and title
//! - `error.rs` - Error types with user-friendly messages

mod dashboard;
mod error;
mod io;
mod selection;
mod store;

pub use dashboard::{
    ACTIVE_SHEET_KEY, LEGACY_WIDGETS_KEY, SHEETS_KEY, TITLE_KEY, load_dashboard, save_dashboard,
};
pub use error::{DatasetError, PersistenceError, Result};
pub use io::{
    compute_file_hash, dataset_fingerprint, demo_dataset, fingerprint_bytes, load_dataset,
    parse_dataset,
};
pub use selection::{SELECTIONS_KEY, SelectionPersistence, StoredSelections};
pub use store::{CURRENT_SCHEMA_VERSION, JsonFileStore, KeyValueStore, MemoryStore, get_as, set_as};
