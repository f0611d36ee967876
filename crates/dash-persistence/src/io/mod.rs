//! File-backed inputs: dataset documents and their fingerprints.

mod dataset;
mod hash;

pub use dataset::{demo_dataset, load_dataset, parse_dataset};
pub use hash::{compute_file_hash, dataset_fingerprint, fingerprint_bytes};
