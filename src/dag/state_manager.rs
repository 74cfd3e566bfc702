// src/dag/state_manager.rs

//! State transitions for one session's tasks.

use std::collections::BTreeMap;

use tracing::debug;

use crate::dag::task_info::{RunState, ScheduledTask};
use crate::dag::{TaskGraph, TaskName};
use crate::exec::SessionId;

/// Mutable view over a session's task states.
pub struct StateManager<'a> {
    graph: &'a TaskGraph,
    states: &'a mut BTreeMap<TaskName, RunState>,
    session: SessionId,
}

impl<'a> StateManager<'a> {
    pub fn new(
        graph: &'a TaskGraph,
        states: &'a mut BTreeMap<TaskName, RunState>,
        session: SessionId,
    ) -> Self {
        Self {
            graph,
            states,
            session,
        }
    }

    pub fn prerequisites_satisfied(&self, task: &str) -> bool {
        ReadOnlyStateManager::new(self.graph, &*self.states).prerequisites_satisfied(task)
    }

    /// Mark every `Pending` task whose prerequisites are satisfied as
    /// `Running` and return them, in name order.
    pub fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        // Decide first, then mutate to avoid borrowing issues.
        let candidates: Vec<TaskName> = self
            .states
            .iter()
            .filter(|(name, state)| {
                matches!(state, RunState::Pending) && self.prerequisites_satisfied(name)
            })
            .map(|(name, _)| name.clone())
            .collect();

        let mut ready = Vec::with_capacity(candidates.len());
        for name in candidates {
            debug!(
                task = %name,
                session = %self.session,
                "prerequisites satisfied; marking Running"
            );
            self.states.insert(name.clone(), RunState::Running);
            ready.push(ScheduledTask {
                name,
                session: self.session,
            });
        }
        ready
    }

    /// Mark every task that has not started yet as `Skipped`.
    ///
    /// Returns the names that were skipped.
    pub fn skip_pending(&mut self) -> Vec<TaskName> {
        let mut skipped = Vec::new();
        for (name, state) in self.states.iter_mut() {
            if matches!(state, RunState::Pending) {
                *state = RunState::Skipped;
                skipped.push(name.clone());
            }
        }
        if !skipped.is_empty() {
            debug!(session = %self.session, ?skipped, "skipping tasks that never started");
        }
        skipped
    }
}

/// Read-only view of a session's task states.
///
/// Used where the scheduler only has shared access (queries, tests).
pub struct ReadOnlyStateManager<'a> {
    graph: &'a TaskGraph,
    states: &'a BTreeMap<TaskName, RunState>,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(graph: &'a TaskGraph, states: &'a BTreeMap<TaskName, RunState>) -> Self {
        Self { graph, states }
    }

    /// A task is ready once every prerequisite succeeded in this session.
    ///
    /// Success from earlier sessions never counts.
    pub fn prerequisites_satisfied(&self, task: &str) -> bool {
        self.graph
            .prerequisites_of(task)
            .iter()
            .all(|p| matches!(self.states.get(p), Some(RunState::DoneSuccess)))
    }

    pub fn all_tasks_terminal(&self) -> bool {
        self.states.values().all(|s| s.is_terminal())
    }
}
