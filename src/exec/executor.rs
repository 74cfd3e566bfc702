// src/exec/executor.rs

//! Async shell around the per-session [`Scheduler`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::dag::{ScheduledTask, Scheduler, TaskContext, TaskGraph, TaskName, TaskOutcome};
use crate::errors::{AssetflowError, Result};

use super::session::{Session, SessionId};

/// Summary of a successful session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session: SessionId,
    /// Tasks in the order they completed.
    pub completed: Vec<TaskName>,
    pub elapsed: Duration,
}

/// Runs named tasks from a validated [`TaskGraph`].
///
/// Tasks whose prerequisites are all satisfied are spawned together and run
/// concurrently; a task never starts before every prerequisite succeeded in
/// the same session.
#[derive(Debug)]
pub struct Executor {
    graph: Arc<TaskGraph>,
    next_session: AtomicU64,
}

type Finished = (TaskName, Duration, Result<()>);

impl Executor {
    /// Finalise `graph` and build an executor for it.
    ///
    /// Unknown prerequisites and cycles are reported here, before any action
    /// can run.
    pub fn new(graph: TaskGraph) -> Result<Self> {
        graph.validate()?;
        Ok(Self {
            graph: Arc::new(graph),
            next_session: AtomicU64::new(1),
        })
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Allocate a fresh session token.
    pub fn new_session(&self) -> Session {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        Session::new(SessionId(id))
    }

    /// Convenience: run `entry` in a fresh session.
    pub async fn run_once(&self, entry: &str) -> Result<SessionReport> {
        let session = self.new_session();
        self.run(entry, &session).await
    }

    /// Run `entry` and every transitive prerequisite exactly once within
    /// `session`.
    ///
    /// On the first failure no further task is started, tasks already running
    /// are awaited, and the failure is returned as `TaskFailed`. Outputs that
    /// were already written stay where they are.
    pub async fn run(&self, entry: &str, session: &Session) -> Result<SessionReport> {
        let started_at = Instant::now();
        let mut scheduler = Scheduler::for_entry(&self.graph, entry, session.id())?;

        info!(task = entry, session = %session.id(), "starting session");

        let mut in_flight: JoinSet<Finished> = JoinSet::new();
        let mut completed = Vec::new();
        let mut failure: Option<AssetflowError> = None;

        let initial = scheduler.start();
        self.dispatch(initial, session, &mut in_flight);

        while !in_flight.is_empty() {
            let joined = tokio::select! {
                biased;
                _ = session.cancel_token().cancelled() => {
                    in_flight.abort_all();
                    let skipped = scheduler.abort();
                    warn!(
                        session = %session.id(),
                        ?skipped,
                        "session cancelled; aborting in-flight tasks"
                    );
                    return Err(AssetflowError::Cancelled(session.id()));
                }
                joined = in_flight.join_next() => joined,
            };

            let Some(joined) = joined else { break };

            let (name, elapsed, result) = match joined {
                Ok(finished) => finished,
                Err(join_err) => {
                    in_flight.abort_all();
                    scheduler.abort();
                    error!(session = %session.id(), error = %join_err, "task panicked");
                    return Err(AssetflowError::Other(anyhow!("task panicked: {join_err}")));
                }
            };

            match result {
                Ok(()) => {
                    info!(
                        task = %name,
                        session = %session.id(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "finished task"
                    );
                    completed.push(name.clone());
                    let step = scheduler.complete(&name, TaskOutcome::Success);
                    self.dispatch(step.newly_scheduled, session, &mut in_flight);
                }
                Err(err) => {
                    error!(
                        task = %name,
                        session = %session.id(),
                        error = %err,
                        "task failed"
                    );
                    let step = scheduler.complete(&name, TaskOutcome::Failed);
                    if !step.newly_skipped.is_empty() {
                        debug!(skipped = ?step.newly_skipped, "not starting dependents of failed task");
                    }
                    if failure.is_none() {
                        failure = Some(AssetflowError::TaskFailed {
                            task: name,
                            source: Box::new(err),
                        });
                    }
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }

        let elapsed = started_at.elapsed();
        info!(
            task = entry,
            session = %session.id(),
            elapsed_ms = elapsed.as_millis() as u64,
            "session finished"
        );

        Ok(SessionReport {
            session: session.id(),
            completed,
            elapsed,
        })
    }

    fn dispatch(
        &self,
        tasks: Vec<ScheduledTask>,
        session: &Session,
        in_flight: &mut JoinSet<Finished>,
    ) {
        for scheduled in tasks {
            let Some(task) = self.graph.task(&scheduled.name) else {
                warn!(task = %scheduled.name, "scheduled task missing from graph; ignoring");
                continue;
            };

            let action = task.action();
            let ctx = TaskContext {
                task: scheduled.name.clone(),
                session: session.id(),
                cancel: session.cancel_token().clone(),
            };

            info!(task = %scheduled.name, session = %session.id(), "starting task");

            in_flight.spawn(async move {
                let started = Instant::now();
                let name = ctx.task.clone();
                let result = action.run(ctx).await;
                (name, started.elapsed(), result)
            });
        }
    }
}
