#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::Barrier;

use assetflow::config::{ConfigFile, RawConfigFile};
use assetflow::dag::TaskGraph;
use assetflow::pipeline::{build_task_graph, Collaborators, PipelineContext};
use assetflow::types::TriggerWhileRunningBehaviour;

use crate::recording::{EventLog, RecordingAction};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn behaviour(mut self, behaviour: TriggerWhileRunningBehaviour) -> Self {
        self.config.config.triggered_while_running_behaviour = behaviour;
        self
    }

    pub fn queue_length(mut self, len: usize) -> Self {
        self.config.config.queue_length = len;
        self
    }

    pub fn temp(mut self, dir: &str) -> Self {
        self.config.config.temp = dir.to_string();
        self
    }

    pub fn transpile_cmd(mut self, cmd: &str) -> Self {
        self.config.scripts.transpile_cmd = Some(cmd.to_string());
        self
    }

    pub fn styles_compile_cmd(mut self, cmd: &str) -> Self {
        self.config.styles.compile_cmd = Some(cmd.to_string());
        self
    }

    pub fn styles_load_path(mut self, dir: &str) -> Self {
        self.config.styles.load_paths.push(dir.to_string());
        self
    }

    pub fn lint_cmd(mut self, cmd: &str) -> Self {
        self.config.lint.cmd = Some(cmd.to_string());
        self
    }

    pub fn inject_dest(mut self, dest: &str) -> Self {
        self.config.inject.dest = Some(dest.to_string());
        self
    }

    pub fn watch_task(mut self, task: &str) -> Self {
        self.config.watch.task = task.to_string();
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.config.watch.use_hash = val;
        self
    }

    /// Direct access for settings without a dedicated method.
    pub fn raw_mut(&mut self) -> &mut RawConfigFile {
        &mut self.config
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for task graphs whose actions are [`RecordingAction`]s sharing one
/// [`EventLog`].
pub struct GraphBuilder {
    graph: TaskGraph,
    log: EventLog,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: TaskGraph::new(),
            log: EventLog::new(),
        }
    }

    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    pub fn task(self, name: &str, prerequisites: &[&str]) -> Self {
        let action = RecordingAction::new(self.log.clone());
        self.with_action(name, prerequisites, action)
    }

    pub fn slow_task(self, name: &str, prerequisites: &[&str], delay: Duration) -> Self {
        let action = RecordingAction::new(self.log.clone()).with_delay(delay);
        self.with_action(name, prerequisites, action)
    }

    pub fn failing_task(self, name: &str, prerequisites: &[&str]) -> Self {
        let action = RecordingAction::new(self.log.clone()).failing();
        self.with_action(name, prerequisites, action)
    }

    pub fn barrier_task(self, name: &str, prerequisites: &[&str], barrier: Arc<Barrier>) -> Self {
        let action = RecordingAction::new(self.log.clone()).with_barrier(barrier);
        self.with_action(name, prerequisites, action)
    }

    pub fn with_action(mut self, name: &str, prerequisites: &[&str], action: RecordingAction) -> Self {
        self.graph
            .register(name, prerequisites, Arc::new(action))
            .expect("task names in tests are unique");
        self
    }

    pub fn build(self) -> (TaskGraph, EventLog) {
        (self.graph, self.log)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Temporary project directory with helpers for writing sources and
/// building a pipeline against it.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp project dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn file(&self, rel: &str, contents: &str) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
        self
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("read fixture file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Pipeline context with the default collaborators for `cfg`.
    pub fn context(&self, cfg: ConfigFile) -> Arc<PipelineContext> {
        let collaborators = Collaborators::from_config(&cfg, self.root());
        Arc::new(PipelineContext::new(self.root(), cfg, collaborators))
    }

    /// Validated task graph for the pipeline over this project.
    pub fn graph(&self, cfg: ConfigFile) -> TaskGraph {
        build_task_graph(self.context(cfg)).expect("pipeline graph builds")
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
