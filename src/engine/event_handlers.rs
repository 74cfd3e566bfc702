// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::BTreeMap;

use tracing::{debug, error, info, warn};

use crate::dag::TaskName;
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, SessionOutcome, TriggerReason};
use crate::exec::SessionId;
use crate::types::TriggerWhileRunningBehaviour;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start a fresh session with `task` as its entry.
    StartSession { task: TaskName, session: SessionId },
    /// Signal cancellation to a running session.
    CancelSession(SessionId),
    /// Request that the process exits (used with `exit_when_idle`).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Sessions the core believes are still running, keyed by id.
#[derive(Debug, Default)]
pub struct SessionTable {
    active: BTreeMap<SessionId, TaskName>,
    next_id: u64,
}

impl SessionTable {
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    pub fn active_ids(&self) -> Vec<SessionId> {
        self.active.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Allocate a new session for `task` and return the matching command.
    fn open(&mut self, task: TaskName) -> CoreCommand {
        self.next_id += 1;
        let session = SessionId(self.next_id);
        debug!(task = %task, session = %session, "opening session");
        self.active.insert(session, task.clone());
        CoreCommand::StartSession { task, session }
    }

    fn close(&mut self, session: SessionId) -> Option<TaskName> {
        self.active.remove(&session)
    }
}

/// Handle a task trigger event.
///
/// - If no session is running, start one for this trigger plus anything
///   that was already queued.
/// - Otherwise apply the configured behaviour:
///   - `Queue`: remember the trigger for after the running sessions.
///   - `Cancel`: remember the trigger and cancel the running sessions.
///   - `Parallel`: start another session right away.
pub fn handle_task_trigger(
    sessions: &mut SessionTable,
    queue: &mut TriggerQueue,
    task: TaskName,
    reason: TriggerReason,
) -> CoreStep {
    match &reason {
        TriggerReason::FileWatch { path, kind } => {
            info!("File {path} was {kind}, running tasks...");
        }
        TriggerReason::Manual => {
            debug!(task = %task, "manual trigger");
        }
    }

    if sessions.is_idle() {
        let mut triggers = queue.drain_pending();
        if !triggers.contains(&task) {
            triggers.push(task);
            triggers.sort();
        }
        let commands = triggers.into_iter().map(|t| sessions.open(t)).collect();
        return CoreStep::running(commands);
    }

    let mut commands = Vec::new();
    match queue.behaviour() {
        TriggerWhileRunningBehaviour::Queue => {
            debug!(task = %task, running = sessions.len(), "session running; queueing trigger");
            queue.record_trigger(&task);
        }
        TriggerWhileRunningBehaviour::Cancel => {
            debug!(task = %task, running = sessions.len(), "session running; cancelling it");
            queue.record_trigger(&task);
            commands.extend(
                sessions
                    .active_ids()
                    .into_iter()
                    .map(CoreCommand::CancelSession),
            );
        }
        TriggerWhileRunningBehaviour::Parallel => {
            commands.push(sessions.open(task));
        }
    }

    CoreStep::running(commands)
}

/// Handle a session completion event.
pub fn handle_session_finished(
    sessions: &mut SessionTable,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    session: SessionId,
    outcome: SessionOutcome,
) -> CoreStep {
    match sessions.close(session) {
        Some(task) => match &outcome {
            SessionOutcome::Succeeded => info!(task = %task, session = %session, "build finished"),
            SessionOutcome::Cancelled => info!(task = %task, session = %session, "build cancelled"),
            SessionOutcome::Failed(message) => {
                error!(task = %task, session = %session, "build failed: {message}; still watching")
            }
        },
        None => warn!(session = %session, "completion for unknown session ignored"),
    }

    let mut commands = Vec::new();
    if sessions.is_idle() && !queue.is_empty() {
        for task in queue.drain_pending() {
            commands.push(sessions.open(task));
        }
    }

    let mut keep_running = true;
    if options.exit_when_idle && sessions.is_idle() && queue.is_empty() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}

/// Handle a shutdown request: cancel everything still running and stop.
pub fn handle_shutdown(sessions: &mut SessionTable) -> CoreStep {
    let commands = sessions
        .active_ids()
        .into_iter()
        .map(CoreCommand::CancelSession)
        .collect();
    CoreStep {
        commands,
        keep_running: false,
    }
}
