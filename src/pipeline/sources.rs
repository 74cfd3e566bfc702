// src/pipeline/sources.rs

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::watch::{collect_matching_files, glob_base, PatternSet};

/// Files matched by a group of glob patterns, plus the base directory that
/// output paths are made relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    /// Matched files, sorted by path.
    pub files: Vec<PathBuf>,
    /// `root` joined with the literal prefix of the first include pattern.
    pub base: PathBuf,
}

impl SourceSet {
    pub fn collect(
        fs: &dyn FileSystem,
        root: &Path,
        include: &[String],
        exclude: &[String],
    ) -> Result<Self> {
        let patterns = PatternSet::new(include, exclude)?;
        let files = collect_matching_files(fs, root, &patterns)
            .with_context(|| format!("collecting files for {:?}", include))?;
        let base = match include.first() {
            Some(first) => root.join(glob_base(first)),
            None => root.to_path_buf(),
        };
        Ok(Self { files, base })
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `file` relative to the base, with forward slashes.
    pub fn relative(&self, file: &Path) -> String {
        file.strip_prefix(&self.base)
            .unwrap_or(file)
            .to_string_lossy()
            .replace('\\', "/")
    }
}
