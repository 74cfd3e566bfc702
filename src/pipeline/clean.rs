// src/pipeline/clean.rs

use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::{AssetflowError, Result};
use crate::fs::FileSystem;

/// Remove the transient output tree at `path`.
///
/// A missing path is not an error. Any other failure is returned as
/// `AssetflowError::Clean`, since stale output surviving a failed clean would
/// leak into the next build.
pub fn clean(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    match fs.remove_dir_all(path) {
        Ok(()) => {
            info!(path = ?path, "cleaned output directory");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = ?path, "nothing to clean");
            Ok(())
        }
        Err(source) => Err(AssetflowError::Clean {
            path: path.to_path_buf(),
            source,
        }),
    }
}
