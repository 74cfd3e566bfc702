// src/pipeline/lint.rs

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tracing::{info, warn};

use crate::errors::{AssetflowError, Result};
use crate::exec::process::{run_shell, shell_quote};
use crate::exec::CancelToken;
use crate::watch::relative_str;

pub type LintFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Pass/fail gate over a set of files.
pub trait Linter: Send + Sync {
    fn lint<'a>(&'a self, files: &'a [PathBuf], cancel: &'a CancelToken) -> LintFuture<'a>;
}

/// Runs `<cmd> <files...>` in the project root; a non-zero exit fails with
/// the combined output as report.
#[derive(Debug, Clone)]
pub struct CommandLinter {
    cmd: String,
    root: PathBuf,
}

impl CommandLinter {
    pub fn new(cmd: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            root: root.into(),
        }
    }

    fn command_line(&self, files: &[PathBuf]) -> String {
        let mut line = self.cmd.clone();
        for file in files {
            let arg = relative_str(&self.root, file).unwrap_or_else(|| file.display().to_string());
            line.push(' ');
            line.push_str(&shell_quote(&arg));
        }
        line
    }
}

impl Linter for CommandLinter {
    fn lint<'a>(&'a self, files: &'a [PathBuf], cancel: &'a CancelToken) -> LintFuture<'a> {
        Box::pin(async move {
            if files.is_empty() {
                info!("no files to lint");
                return Ok(());
            }

            let line = self.command_line(files);
            let output = run_shell(&line, &self.root, None, &[], cancel).await?;
            if output.success {
                info!(files = files.len(), "lint passed");
                return Ok(());
            }

            let report = format!("{}{}", output.stdout, output.stderr);
            Err(AssetflowError::LintFailed(report.trim_end().to_string()))
        })
    }
}

/// Linter used when no lint command is configured. Always passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLinter;

impl Linter for NoLinter {
    fn lint<'a>(&'a self, files: &'a [PathBuf], _cancel: &'a CancelToken) -> LintFuture<'a> {
        Box::pin(async move {
            warn!(files = files.len(), "no [lint].cmd configured; skipping lint");
            Ok(())
        })
    }
}

