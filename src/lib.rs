// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod inject;
pub mod logging;
pub mod order;
pub mod pipeline;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::{CliArgs, Command};
use crate::config::{config_root_dir, load_and_validate, ConfigFile};
use crate::dag::TaskGraph;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::AssetflowError;
use crate::exec::{Executor, RealExecutorBackend};
use crate::pipeline::{build_task_graph, Collaborators, PipelineContext};
use crate::types::TriggerWhileRunningBehaviour;
use crate::watch::{spawn_watcher, WatchProfile};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - collaborators and the pipeline task graph
/// - executor
/// - (for `watch`) the file watcher, dispatcher runtime and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let root = config_root_dir(&config_path);

    let collaborators = Collaborators::from_config(&cfg, root.clone());
    let ctx = Arc::new(PipelineContext::new(root.clone(), cfg.clone(), collaborators));
    let executor = Arc::new(Executor::new(build_task_graph(ctx)?)?);

    match args.command.unwrap_or(Command::Tasks) {
        Command::Tasks => {
            print_tasks(executor.graph());
            Ok(())
        }
        Command::Clean => run_task(&executor, pipeline::CLEAN).await,
        Command::Build => run_task(&executor, pipeline::BUILD).await,
        Command::Lint => run_task(&executor, pipeline::LINT).await,
        Command::Run { task } => run_task(&executor, &task).await,
        Command::Watch { on_trigger } => {
            let behaviour = on_trigger.unwrap_or(cfg.config.triggered_while_running_behaviour);
            watch(executor, &cfg, &root, behaviour).await
        }
    }
}

/// Run `task` once; any failure makes the process exit non-zero.
async fn run_task(executor: &Executor, task: &str) -> Result<()> {
    let report = executor.run_once(task).await?;
    info!(
        task,
        tasks = report.completed.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "done"
    );
    Ok(())
}

/// Build once, then keep rebuilding the configured task on file changes
/// until Ctrl-C.
async fn watch(
    executor: Arc<Executor>,
    cfg: &ConfigFile,
    root: &Path,
    behaviour: TriggerWhileRunningBehaviour,
) -> Result<()> {
    let entry = cfg.watch.task.clone();
    if !executor.graph().contains(&entry) {
        return Err(AssetflowError::TaskNotFound(entry).into());
    }

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let backend = RealExecutorBackend::new(Arc::clone(&executor), rt_tx.clone());

    let profile = WatchProfile::from_config(&cfg.watch)?;
    let fs: Arc<dyn fs::FileSystem> = Arc::new(fs::RealFileSystem);
    let _watcher_handle = spawn_watcher(root.to_path_buf(), profile, fs, rt_tx.clone())?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    info!(entry = %entry, "watching for changes");

    // Initial full build; later triggers re-run the watch entry task.
    rt_tx
        .send(RuntimeEvent::TaskTriggered {
            task: pipeline::BUILD.to_string(),
            reason: TriggerReason::Manual,
        })
        .await?;

    info!(?behaviour, "triggers while a build is running");
    let core = CoreRuntime::new(
        behaviour,
        cfg.config.queue_length,
        RuntimeOptions::default(),
    );

    Runtime::new(core, rt_rx, backend).run().await?;
    Ok(())
}

/// Task listing printed by `assetflow tasks` (and when no command is given).
fn print_tasks(graph: &TaskGraph) {
    println!("assetflow tasks:");
    for name in graph.tasks() {
        let description = graph
            .task(name)
            .and_then(|t| t.description.as_deref())
            .unwrap_or("");
        println!("  {name:<10} {description}");

        let prerequisites = graph.prerequisites_of(name);
        if !prerequisites.is_empty() {
            println!("  {:<10} after: {}", "", prerequisites.join(", "));
        }
    }
}
