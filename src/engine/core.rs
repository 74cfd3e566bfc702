// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - starting and cancelling sessions through the executor backend
//! - handling Ctrl+C / shutdown
//!
//! The core can be tested without any Tokio, channels, filesystem, or
//! processes.

use crate::engine::event_handlers::{
    handle_session_finished, handle_shutdown, handle_task_trigger, CoreStep, SessionTable,
};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::exec::SessionId;
use crate::types::TriggerWhileRunningBehaviour;

/// Pure core runtime state.
///
/// This owns:
/// - the table of active sessions
/// - the trigger queue
/// - runtime options (e.g. `exit_when_idle`)
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    sessions: SessionTable,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(
        behaviour: TriggerWhileRunningBehaviour,
        queue_length: usize,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            sessions: SessionTable::default(),
            queue: TriggerQueue::new(behaviour, queue_length),
            options,
        }
    }

    /// True when no session is running.
    pub fn is_idle(&self) -> bool {
        self.sessions.is_idle()
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn active_sessions(&self) -> Vec<SessionId> {
        self.sessions.active_ids()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                handle_task_trigger(&mut self.sessions, &mut self.queue, task, reason)
            }
            RuntimeEvent::SessionFinished { session, outcome } => handle_session_finished(
                &mut self.sessions,
                &mut self.queue,
                &self.options,
                session,
                outcome,
            ),
            RuntimeEvent::ShutdownRequested => handle_shutdown(&mut self.sessions),
        }
    }
}
