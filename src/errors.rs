// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Graph errors (`DuplicateTask`, `UnknownPrerequisite`, `CyclicDependency`)
//! are raised while the task graph is finalised, before any action runs.
//! Everything an action can fail with is wrapped in `TaskFailed` by the
//! executor so the caller learns which task broke the session.

use std::path::PathBuf;

use thiserror::Error;

use crate::dag::TaskName;
use crate::exec::SessionId;

#[derive(Error, Debug)]
pub enum AssetflowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("task '{0}' is already registered")]
    DuplicateTask(TaskName),

    #[error("task '{task}' has unknown prerequisite '{prerequisite}'")]
    UnknownPrerequisite {
        task: TaskName,
        prerequisite: TaskName,
    },

    #[error("Task not found: {0}")]
    TaskNotFound(TaskName),

    /// Task names along the cycle; the first name is repeated at the end.
    #[error("cycle detected in task graph: {}", .0.join(" -> "))]
    CyclicDependency(Vec<TaskName>),

    /// Identifiers (module name, or path for anonymous files) left unordered.
    #[error("cycle detected among script modules: {}", .0.join(", "))]
    CyclicScriptDependency(Vec<String>),

    #[error("injection marker '{marker}' not found in target document")]
    MarkerNotFound { marker: String },

    #[error("failed to transform {}: {message}", .path.display())]
    Transform { path: PathBuf, message: String },

    #[error("failed to clean {}: {source}", .path.display())]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lint failed:\n{0}")]
    LintFailed(String),

    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        task: TaskName,
        #[source]
        source: Box<AssetflowError>,
    },

    #[error("session {0} was cancelled")]
    Cancelled(SessionId),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AssetflowError {
    /// The innermost error, looking through `TaskFailed` wrappers.
    pub fn root_cause(&self) -> &AssetflowError {
        match self {
            AssetflowError::TaskFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetflowError>;
