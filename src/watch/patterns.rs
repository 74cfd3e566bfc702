// src/watch/patterns.rs

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::WatchSection;
use crate::dag::TaskName;
use crate::fs::FileSystem;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Compiled include/exclude glob patterns, matched against paths relative to
/// the project root (forward slashes).
#[derive(Clone)]
pub struct PatternSet {
    include: GlobSet,
    exclude: Option<GlobSet>,
    bases: Vec<PathBuf>,
}

impl fmt::Debug for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternSet")
            .field("bases", &self.bases)
            .finish_non_exhaustive()
    }
}

impl PatternSet {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let include_set = build_globset(include).context("building include globset")?;
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };

        let bases: BTreeSet<PathBuf> = include.iter().map(|p| glob_base(p)).collect();

        Ok(Self {
            include: include_set,
            exclude: exclude_set,
            bases: bases.into_iter().collect(),
        })
    }

    /// Returns true if `rel_path` matches an include pattern and no exclude
    /// pattern.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(rel_path),
            None => true,
        }
    }

    /// Literal directory prefixes of the include patterns, relative to the
    /// root. Used to bound directory walks.
    pub fn bases(&self) -> &[PathBuf] {
        &self.bases
    }
}

/// Watch profile built from the `[watch]` section.
#[derive(Debug, Clone)]
pub struct WatchProfile {
    task: TaskName,
    patterns: PatternSet,
    use_hash: bool,
}

impl WatchProfile {
    pub fn new(task: impl Into<TaskName>, patterns: PatternSet, use_hash: bool) -> Self {
        Self {
            task: task.into(),
            patterns,
            use_hash,
        }
    }

    pub fn from_config(section: &WatchSection) -> Result<Self> {
        let patterns = PatternSet::new(&section.patterns, &section.exclude)
            .context("building watch patterns")?;
        Ok(Self::new(section.task.clone(), patterns, section.use_hash))
    }

    /// Task triggered when a watched file changes.
    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn use_hash(&self) -> bool {
        self.use_hash
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.patterns.matches(rel_path)
    }
}

/// Build a GlobSet from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Literal directory prefix of a glob pattern.
///
/// `public/app/**/*.js` has base `public/app`; a pattern without any glob
/// syntax has its parent directory as base.
pub fn glob_base(pattern: &str) -> PathBuf {
    let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty() && *c != ".").collect();
    let literal = components
        .iter()
        .take_while(|c| !c.contains(GLOB_META))
        .count();

    let take = if literal == components.len() {
        literal.saturating_sub(1)
    } else {
        literal
    };

    components[..take].iter().collect()
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Falls back to canonicalized paths when the direct prefix check fails
/// (symlinked temp dirs, `/private/var` on macOS). Returns `None` if the
/// path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    None
}

/// Collect all files under `root` matching `patterns`, sorted by path.
///
/// Only the literal base directories of the include patterns are walked.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    patterns: &PatternSet,
) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for base in patterns.bases() {
        let start = root.join(base);
        if !fs.is_dir(&start) {
            continue;
        }

        let mut stack = vec![start];
        while let Some(dir) = stack.pop() {
            for path in fs.read_dir(&dir)? {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) {
                    let matched = relative_str(root, &path)
                        .map(|rel| patterns.matches(&rel))
                        .unwrap_or(false);
                    if matched {
                        files.insert(path);
                    }
                }
            }
        }
    }

    Ok(files.into_iter().collect())
}
