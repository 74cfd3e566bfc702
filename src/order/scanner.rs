// src/order/scanner.rs

//! Best-effort static scan of compiled scripts for module declarations.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// `angular.module('id')` or `angular.module('id', [deps])`.
static MODULE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"angular\s*\.\s*module\s*\(\s*['"]([^'"]+)['"]\s*(?:,\s*\[([^\]]*)\])?"#)
        .expect("module call pattern is valid")
});

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("quoted string pattern is valid"));

/// A compiled script file plus its declared module identity and dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledScriptUnit {
    pub path: PathBuf,
    /// Declared module identifier, if the file declares one.
    pub module: Option<String>,
    /// Identifiers this file depends on, in first-seen order.
    pub dependencies: Vec<String>,
}

impl CompiledScriptUnit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            module: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dep in deps {
            self.add_dependency(dep.into());
        }
        self
    }

    fn add_dependency(&mut self, dep: String) {
        if self.module.as_deref() != Some(dep.as_str()) && !self.dependencies.contains(&dep) {
            self.dependencies.push(dep);
        }
    }

    /// Name used when reporting this unit: the module id, else the path.
    pub fn label(&self) -> String {
        match &self.module {
            Some(module) => module.clone(),
            None => self.path.display().to_string(),
        }
    }
}

/// Extracts module identity and dependencies from script text.
pub trait ModuleScanner: Send + Sync {
    fn scan(&self, path: &Path, source: &str) -> CompiledScriptUnit;
}

/// Recognises AngularJS module calls.
///
/// - `angular.module('id', [...])` declares `id`; the listed modules are
///   dependencies. The first declaration in a file is its identity.
/// - `angular.module('id')` retrieves an existing module, so the file
///   depends on `id` unless it declared `id` itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngularModuleScanner;

impl ModuleScanner for AngularModuleScanner {
    fn scan(&self, path: &Path, source: &str) -> CompiledScriptUnit {
        let mut unit = CompiledScriptUnit::new(path);
        let mut references = Vec::new();

        for caps in MODULE_CALL.captures_iter(source) {
            let id = caps[1].to_string();
            match caps.get(2) {
                Some(list) => {
                    if unit.module.is_none() {
                        unit.module = Some(id);
                    } else {
                        debug!(?path, module = %id, "additional module declaration ignored as identity");
                    }
                    for dep in QUOTED.captures_iter(list.as_str()) {
                        references.push(dep[1].to_string());
                    }
                }
                None => references.push(id),
            }
        }

        // Deferred so a reference that precedes the declaration of the same
        // module is not recorded as a dependency.
        for dep in references {
            unit.add_dependency(dep);
        }

        debug!(
            ?path,
            module = ?unit.module,
            deps = ?unit.dependencies,
            "scanned script"
        );
        unit
    }
}
