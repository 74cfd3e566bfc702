use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::{ReadOnlyStateManager, StateManager};
use crate::dag::task_info::{RunState, ScheduledTask, TaskRunState};
use crate::dag::TaskName;
use crate::errors::Result;
use crate::exec::SessionId;

/// Outcome of a task action as far as the scheduler cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Pure state machine for a single session.
///
/// It is responsible for:
/// - restricting the session to the entry task's prerequisite closure
/// - deciding when a task is ready (all prerequisites succeeded *in this
///   session*)
/// - aborting the session on the first failure: nothing new starts, tasks
///   already running are allowed to finish
///
/// It performs no IO, so the executor and tests can drive it step by step.
#[derive(Debug)]
pub struct Scheduler<'g> {
    graph: &'g TaskGraph,
    session: SessionId,
    states: BTreeMap<TaskName, RunState>,
    aborted: bool,
    started: bool,
}

impl<'g> Scheduler<'g> {
    /// Prepare a session that will run `entry` and its transitive
    /// prerequisites. Every task in the closure starts out `Pending`.
    pub fn for_entry(graph: &'g TaskGraph, entry: &str, session: SessionId) -> Result<Self> {
        let closure = graph.closure(entry)?;
        let states = closure
            .into_iter()
            .map(|name| (name, RunState::Pending))
            .collect::<BTreeMap<_, _>>();

        debug!(
            entry,
            session = %session,
            tasks = states.len(),
            "scheduler: prepared session"
        );

        Ok(Self {
            graph,
            session,
            states,
            aborted: false,
            started: false,
        })
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Read-only view of the given task's state in this session.
    pub fn run_state_of(&self, task: &str) -> TaskRunState {
        self.states.get(task).copied().into()
    }

    /// Names of tasks participating in this session.
    pub fn tasks_in_session(&self) -> Vec<TaskName> {
        self.states.keys().cloned().collect()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// True once no task is pending or running.
    pub fn is_finished(&self) -> bool {
        self.read_only().all_tasks_terminal()
    }

    /// Whether every prerequisite of `task` succeeded in this session.
    pub fn prerequisites_satisfied(&self, task: &str) -> bool {
        self.read_only().prerequisites_satisfied(task)
    }

    /// Dispatch the initial wave: tasks without prerequisites in the closure.
    pub fn start(&mut self) -> Vec<ScheduledTask> {
        if self.started {
            warn!(session = %self.session, "scheduler: start called twice; ignoring");
            return Vec::new();
        }
        self.started = true;
        let mut manager = StateManager::new(self.graph, &mut self.states, self.session);
        manager.collect_new_ready_tasks()
    }

    /// Record a finished task and return what became runnable.
    pub fn complete(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        let mut step = SchedulerStep::default();

        match self.states.get(task).copied() {
            Some(RunState::Running) => {}
            other => {
                warn!(
                    task,
                    session = %self.session,
                    state = ?other,
                    "completion for a task that is not running in this session; ignoring"
                );
                return step;
            }
        }

        match outcome {
            TaskOutcome::Success => {
                self.states.insert(task.to_string(), RunState::DoneSuccess);
                debug!(task, session = %self.session, "task completed successfully");
                if !self.aborted {
                    let mut manager =
                        StateManager::new(self.graph, &mut self.states, self.session);
                    step.newly_scheduled = manager.collect_new_ready_tasks();
                }
            }
            TaskOutcome::Failed => {
                self.states.insert(task.to_string(), RunState::DoneFailed);
                warn!(task, session = %self.session, "task failed; aborting session");
                step.newly_failed.push(task.to_string());
                self.aborted = true;
                let mut manager = StateManager::new(self.graph, &mut self.states, self.session);
                step.newly_skipped = manager.skip_pending();
            }
        }

        step.session_just_finished = self.is_finished();
        if step.session_just_finished {
            info!(
                session = %self.session,
                aborted = self.aborted,
                "scheduler: all tasks terminal; session finished"
            );
        }
        step
    }

    /// Abort without a failing task (e.g. cancellation): skip everything
    /// that has not started.
    pub fn abort(&mut self) -> Vec<TaskName> {
        self.aborted = true;
        let mut manager = StateManager::new(self.graph, &mut self.states, self.session);
        manager.skip_pending()
    }

    fn read_only(&self) -> ReadOnlyStateManager<'_> {
        ReadOnlyStateManager::new(self.graph, &self.states)
    }
}
