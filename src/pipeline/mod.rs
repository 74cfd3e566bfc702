// src/pipeline/mod.rs

//! The asset build itself: collaborators, task actions and their
//! registration into a [`TaskGraph`].
//!
//! | task        | prerequisites                          |
//! |-------------|----------------------------------------|
//! | `clean`     |                                        |
//! | `scripts`   | `clean`                                |
//! | `templates` | `clean`                                |
//! | `styles`    | `clean`                                |
//! | `inject`    | `clean`, `scripts`, `templates`, `styles` |
//! | `build`     | `inject`                               |
//! | `lint`      |                                        |

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ConfigFile;
use crate::dag::{action_fn, NoopAction, Task, TaskAction, TaskContext, TaskGraph};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::inject::{inject_file, reference_path, Marker, ReferenceKind, ReferenceOptions};
use crate::order::{order, AngularModuleScanner, ModuleScanner};

pub mod clean;
pub mod lint;
pub mod sources;
pub mod styles;
pub mod templates;
pub mod transform;

pub use clean::clean;
pub use lint::{CommandLinter, Linter, NoLinter};
pub use sources::SourceSet;
pub use styles::{compile_styles, ScssCompiler};
pub use templates::{AngularTemplateCache, TemplateCompiler, TemplateOptions, TemplateSource};
pub use transform::{run_transform, CommandTransform, ContentTransform, Passthrough};

pub const CLEAN: &str = "clean";
pub const SCRIPTS: &str = "scripts";
pub const TEMPLATES: &str = "templates";
pub const STYLES: &str = "styles";
pub const INJECT: &str = "inject";
pub const BUILD: &str = "build";
pub const LINT: &str = "lint";

/// External collaborators handed to the build tasks.
#[derive(Clone)]
pub struct Collaborators {
    pub script_transpiler: Arc<dyn ContentTransform>,
    pub stylesheet_compiler: Arc<dyn ContentTransform>,
    pub template_compiler: Arc<dyn TemplateCompiler>,
    pub linter: Arc<dyn Linter>,
    pub scanner: Arc<dyn ModuleScanner>,
    pub fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl Collaborators {
    /// Default collaborators for `cfg`, with commands run from `root`.
    pub fn from_config(cfg: &ConfigFile, root: impl Into<PathBuf>) -> Self {
        let root = root.into();

        let script_transpiler: Arc<dyn ContentTransform> = match &cfg.scripts.transpile_cmd {
            Some(cmd) => Arc::new(CommandTransform::new(cmd.clone(), root.clone())),
            None => Arc::new(Passthrough),
        };

        let stylesheet_compiler: Arc<dyn ContentTransform> = match &cfg.styles.compile_cmd {
            Some(cmd) => {
                Arc::new(CommandTransform::new(cmd.clone(), root.clone()).with_output_extension("css"))
            }
            None => Arc::new(
                cfg.styles
                    .load_paths
                    .iter()
                    .fold(ScssCompiler::new(), |compiler, dir| {
                        compiler.with_load_path(root.join(dir))
                    }),
            ),
        };

        let linter: Arc<dyn Linter> = match &cfg.lint.cmd {
            Some(cmd) => Arc::new(CommandLinter::new(cmd.clone(), root)),
            None => Arc::new(NoLinter),
        };

        Self {
            script_transpiler,
            stylesheet_compiler,
            template_compiler: Arc::new(AngularTemplateCache),
            linter,
            scanner: Arc::new(AngularModuleScanner),
            fs: Arc::new(RealFileSystem),
        }
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }
}

/// Everything a build task needs: project root, configuration and
/// collaborators.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub root: PathBuf,
    pub config: ConfigFile,
    pub collaborators: Collaborators,
}

impl PipelineContext {
    pub fn new(root: impl Into<PathBuf>, config: ConfigFile, collaborators: Collaborators) -> Self {
        Self {
            root: root.into(),
            config,
            collaborators,
        }
    }

    fn fs(&self) -> &dyn FileSystem {
        self.collaborators.fs.as_ref()
    }
}

/// Build the task graph for the asset pipeline.
pub fn build_task_graph(ctx: Arc<PipelineContext>) -> Result<TaskGraph> {
    let mut graph = TaskGraph::new();
    register_tasks(&mut graph, ctx)?;
    Ok(graph)
}

/// Register the pipeline tasks into `graph`.
pub fn register_tasks(graph: &mut TaskGraph, ctx: Arc<PipelineContext>) -> Result<()> {
    let tasks = [
        Task::new(CLEAN, vec![], pipeline_action(&ctx, run_clean))
            .with_description("Remove the transient output directory"),
        Task::new(SCRIPTS, names(&[CLEAN]), pipeline_action(&ctx, run_scripts))
            .with_description("Transpile scripts into the output tree"),
        Task::new(TEMPLATES, names(&[CLEAN]), pipeline_action(&ctx, run_templates))
            .with_description("Compile templates into a template cache script"),
        Task::new(STYLES, names(&[CLEAN]), pipeline_action(&ctx, run_styles))
            .with_description("Compile stylesheets (errors are logged, not fatal)"),
        Task::new(
            INJECT,
            names(&[CLEAN, SCRIPTS, TEMPLATES, STYLES]),
            pipeline_action(&ctx, run_inject),
        )
        .with_description("Order scripts and inject references into the target document"),
        Task::new(BUILD, names(&[INJECT]), Arc::new(NoopAction))
            .with_description("Full build"),
        Task::new(LINT, vec![], pipeline_action(&ctx, run_lint))
            .with_description("Lint script sources"),
    ];

    for task in tasks {
        graph.register_task(task)?;
    }
    Ok(())
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn pipeline_action<F, Fut>(ctx: &Arc<PipelineContext>, f: F) -> Arc<dyn TaskAction>
where
    F: Fn(Arc<PipelineContext>, TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let ctx = Arc::clone(ctx);
    action_fn(move |task_ctx| f(Arc::clone(&ctx), task_ctx))
}

async fn run_clean(ctx: Arc<PipelineContext>, _task: TaskContext) -> Result<()> {
    clean(ctx.fs(), &ctx.root.join(&ctx.config.config.temp))
}

async fn run_scripts(ctx: Arc<PipelineContext>, task: TaskContext) -> Result<()> {
    let cfg = &ctx.config.scripts;
    let set = SourceSet::collect(ctx.fs(), &ctx.root, &cfg.src, &cfg.exclude)?;
    run_transform(
        ctx.fs(),
        ctx.collaborators.script_transpiler.as_ref(),
        &set.files,
        &set.base,
        &ctx.root.join(&cfg.dest),
        &task.cancel,
    )
    .await?;
    Ok(())
}

async fn run_templates(ctx: Arc<PipelineContext>, _task: TaskContext) -> Result<()> {
    let cfg = &ctx.config.templates;
    let set = SourceSet::collect(ctx.fs(), &ctx.root, &cfg.src, &[])?;

    let mut sources = Vec::with_capacity(set.files.len());
    for file in &set.files {
        sources.push(TemplateSource {
            rel_path: set.relative(file),
            content: ctx.fs().read_to_string(file)?,
        });
    }

    let options = TemplateOptions {
        module: cfg.module.clone(),
        standalone: cfg.standalone,
        root: cfg.root.clone(),
        minify: cfg.minify,
    };
    let script = ctx.collaborators.template_compiler.compile(&sources, &options)?;

    let out = ctx.root.join(&cfg.dest).join(&cfg.filename);
    ctx.fs().write(&out, script.as_bytes())?;
    info!(templates = sources.len(), out = ?out, "template cache written");
    Ok(())
}

async fn run_styles(ctx: Arc<PipelineContext>, task: TaskContext) -> Result<()> {
    let cfg = &ctx.config.styles;
    let set = SourceSet::collect(ctx.fs(), &ctx.root, &cfg.entry, &[])?;
    if set.is_empty() {
        warn!(entry = ?cfg.entry, "no stylesheet entries found");
    }
    compile_styles(
        ctx.fs(),
        ctx.collaborators.stylesheet_compiler.as_ref(),
        &set.files,
        &set.base,
        &ctx.root.join(&cfg.dest),
        &task.cancel,
    )
    .await;
    Ok(())
}

async fn run_inject(ctx: Arc<PipelineContext>, _task: TaskContext) -> Result<()> {
    let cfg = &ctx.config.inject;
    let fs = ctx.fs();

    let scripts = SourceSet::collect(fs, &ctx.root, &cfg.scripts, &[])?;
    let mut units = Vec::with_capacity(scripts.files.len());
    for file in &scripts.files {
        let source = fs.read_to_string(file)?;
        units.push(ctx.collaborators.scanner.scan(file, &source));
    }
    let ordered = order(&units)?;

    let styles = SourceSet::collect(fs, &ctx.root, &cfg.styles, &[])?;

    let options = ReferenceOptions {
        add_root_slash: cfg.add_root_slash,
        ignore_path: cfg.ignore_path.clone(),
    };
    let script_refs: Vec<String> = ordered
        .iter()
        .map(|file| reference_path(&ctx.root, file, &options))
        .collect();
    let style_refs: Vec<String> = styles
        .files
        .iter()
        .map(|file| reference_path(&ctx.root, file, &options))
        .collect();

    let injections = [
        (
            Marker::new(&cfg.scripts_marker, ReferenceKind::Script, &cfg.marker_start, &cfg.marker_end),
            script_refs,
        ),
        (
            Marker::new(&cfg.styles_marker, ReferenceKind::Stylesheet, &cfg.marker_start, &cfg.marker_end),
            style_refs,
        ),
    ];

    inject_file(
        fs,
        &ctx.root.join(&cfg.target),
        &ctx.root.join(cfg.dest_path()),
        &injections,
    )
}

async fn run_lint(ctx: Arc<PipelineContext>, task: TaskContext) -> Result<()> {
    let cfg = &ctx.config.lint;
    let set = SourceSet::collect(ctx.fs(), &ctx.root, &cfg.src, &cfg.exclude)?;
    ctx.collaborators.linter.lint(&set.files, &task.cancel).await
}
