// src/watch/hash.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::fs::FileSystem;

/// Compute the blake3 hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let bytes = fs
        .read(path)
        .with_context(|| format!("reading file for hashing: {:?}", path))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Last seen content hash per watched file.
///
/// Used when `use_hash = true` so that saving a file without changing its
/// contents does not start a rebuild.
#[derive(Debug, Default)]
pub struct ContentHashes {
    seen: HashMap<PathBuf, String>,
}

impl ContentHashes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hash` for `path`, returning true if it differs from the
    /// previously recorded hash (or if the file was not seen before).
    pub fn update(&mut self, path: &Path, hash: String) -> bool {
        match self.seen.get(path) {
            Some(previous) if *previous == hash => {
                debug!(?path, "content hash unchanged");
                false
            }
            _ => {
                self.seen.insert(path.to_path_buf(), hash);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
