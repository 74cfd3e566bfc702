// src/pipeline/styles.rs

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use tracing::{error, info};

use crate::errors::AssetflowError;
use crate::exec::CancelToken;
use crate::fs::FileSystem;
use crate::pipeline::transform::{output_path, ContentTransform, TransformFuture};

/// Built-in SCSS compiler backed by `grass`.
///
/// `@import`s are resolved relative to the entry file's directory plus any
/// extra load paths.
#[derive(Debug, Clone, Default)]
pub struct ScssCompiler {
    load_paths: Vec<PathBuf>,
}

impl ScssCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.load_paths.push(path.into());
        self
    }
}

impl ContentTransform for ScssCompiler {
    fn transform<'a>(
        &'a self,
        path: &'a Path,
        source: &'a str,
        _cancel: &'a CancelToken,
    ) -> TransformFuture<'a> {
        let source = source.to_string();
        let mut load_paths = self.load_paths.clone();
        if let Some(parent) = path.parent() {
            load_paths.insert(0, parent.to_path_buf());
        }

        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let options = load_paths
                    .iter()
                    .fold(grass::Options::default(), |opts, dir| opts.load_path(dir));
                grass::from_string(source, &options).map_err(|err| anyhow!("{err}"))
            })
            .await
            .context("stylesheet compiler task failed")?
        })
    }

    fn output_extension(&self) -> Option<&str> {
        Some("css")
    }
}

/// Compile every stylesheet entry, logging failures instead of returning
/// them. Returns the outputs that were written.
///
/// A stylesheet error never aborts the session; the build goes on without
/// that file's output.
pub async fn compile_styles(
    fs: &dyn FileSystem,
    compiler: &dyn ContentTransform,
    entries: &[PathBuf],
    base: &Path,
    dest: &Path,
    cancel: &CancelToken,
) -> Vec<PathBuf> {
    let mut written = Vec::new();

    for entry in entries {
        let result = async {
            let source = fs.read_to_string(entry)?;
            let css = compiler.transform(entry, &source, cancel).await?;
            let out = output_path(entry, base, dest, compiler.output_extension());
            fs.write(&out, css.as_bytes())?;
            anyhow::Ok(out)
        }
        .await;

        match result {
            Ok(out) => written.push(out),
            Err(err) => {
                let err = AssetflowError::Transform {
                    path: entry.clone(),
                    message: format!("{err:#}"),
                };
                error!("{err}");
            }
        }
    }

    info!(files = written.len(), dest = ?dest, "stylesheets compiled");
    written
}
