// src/inject/mod.rs

//! Rewriting injection markers in the target document.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::errors::Result;
use crate::fs::FileSystem;

pub mod marker;

pub use marker::{inject, reference_path, Marker, ReferenceKind, ReferenceOptions};

/// Apply every injection to `target` and write the result to `dest`.
///
/// All markers are rewritten in memory first, so a missing marker leaves
/// `dest` untouched.
pub fn inject_file(
    fs: &dyn FileSystem,
    target: &Path,
    dest: &Path,
    injections: &[(Marker, Vec<String>)],
) -> Result<()> {
    let mut document = fs.read_to_string(target)?;

    for (marker, items) in injections {
        document = inject(&document, marker, items)?;
        info!(marker = %marker.name(), items = items.len(), "injected references");
    }

    fs.write(dest, document.as_bytes())
        .with_context(|| format!("writing injected document {:?}", dest))?;
    Ok(())
}
