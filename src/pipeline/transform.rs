// src/pipeline/transform.rs

//! Opaque content transforms and the runner that applies them to a source
//! set.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use anyhow::anyhow;
use tracing::{debug, info};

use crate::errors::{AssetflowError, Result};
use crate::exec::process::run_shell;
use crate::exec::CancelToken;
use crate::fs::FileSystem;

/// Future returned by [`ContentTransform::transform`].
pub type TransformFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

/// `(path, source text) -> compiled text`.
pub trait ContentTransform: Send + Sync {
    fn transform<'a>(
        &'a self,
        path: &'a Path,
        source: &'a str,
        cancel: &'a CancelToken,
    ) -> TransformFuture<'a>;

    /// Extension given to output files, if it differs from the source.
    fn output_extension(&self) -> Option<&str> {
        None
    }
}

/// Identity transform, used when no transpiler is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl ContentTransform for Passthrough {
    fn transform<'a>(
        &'a self,
        _path: &'a Path,
        source: &'a str,
        _cancel: &'a CancelToken,
    ) -> TransformFuture<'a> {
        Box::pin(async move { Ok(source.to_string()) })
    }
}

/// Runs a shell command with the source on stdin and takes its stdout as
/// the compiled text. The source path is exported as `ASSETFLOW_FILE`.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    cmd: String,
    cwd: PathBuf,
    extension: Option<String>,
}

impl CommandTransform {
    pub fn new(cmd: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            cwd: cwd.into(),
            extension: None,
        }
    }

    pub fn with_output_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }
}

impl ContentTransform for CommandTransform {
    fn transform<'a>(
        &'a self,
        path: &'a Path,
        source: &'a str,
        cancel: &'a CancelToken,
    ) -> TransformFuture<'a> {
        Box::pin(async move {
            let envs = [("ASSETFLOW_FILE", path.display().to_string())];
            let output = run_shell(&self.cmd, &self.cwd, Some(source.as_bytes()), &envs, cancel).await?;
            if !output.success {
                let stderr = output.stderr.trim();
                if stderr.is_empty() {
                    return Err(anyhow!("'{}' exited with status {}", self.cmd, output.exit_code));
                }
                return Err(anyhow!("{stderr}"));
            }
            Ok(output.stdout)
        })
    }

    fn output_extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

/// Where the output for `file` goes: its path relative to `base`, under
/// `dest`, with the transform's extension.
pub fn output_path(file: &Path, base: &Path, dest: &Path, extension: Option<&str>) -> PathBuf {
    let rel = file
        .strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| file.file_name().map(PathBuf::from).unwrap_or_default());
    let mut out = dest.join(rel);
    if let Some(ext) = extension {
        out.set_extension(ext);
    }
    out
}

/// Apply `transform` to each file and write the results under `dest`.
///
/// Stops at the first failing file with `AssetflowError::Transform`. Returns
/// the written output paths.
pub async fn run_transform(
    fs: &dyn FileSystem,
    transform: &dyn ContentTransform,
    files: &[PathBuf],
    base: &Path,
    dest: &Path,
    cancel: &CancelToken,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());

    for file in files {
        let source = fs.read_to_string(file)?;
        let compiled = transform
            .transform(file, &source, cancel)
            .await
            .map_err(|err| AssetflowError::Transform {
                path: file.clone(),
                message: format!("{err:#}"),
            })?;

        let out = output_path(file, base, dest, transform.output_extension());
        fs.write(&out, compiled.as_bytes())?;
        debug!(src = ?file, out = ?out, "transformed file");
        written.push(out);
    }

    info!(files = written.len(), dest = ?dest, "transform finished");
    Ok(written)
}
