//! Dataset fingerprinting.
//!
//! A stored selection records the fingerprint of the dataset it was made
//! against, so a selection saved for one file is not replayed on another.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{PersistenceError, Result};

/// Compute SHA-256 hash of a file.
///
/// Uses buffered reading for efficient processing of large files.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| PersistenceError::io("read", path, e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| PersistenceError::io("read", path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Fingerprint of a dataset file: the hex SHA-256 of its bytes.
pub fn dataset_fingerprint(path: &Path) -> Result<String> {
    compute_file_hash(path)
}

/// Fingerprint of an in-memory document, for datasets not read from disk.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
