// src/engine/mod.rs

//! Watch-mode dispatcher.
//!
//! This module ties together:
//! - the trigger queue (what happens when triggers arrive while a session
//!   is running)
//! - the table of active sessions
//! - the main runtime event loop that reacts to:
//!   - file-watch triggers
//!   - session completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]. Triggers from the watcher are consumed by this
//! single dispatcher, so nothing re-enters the executor behind its back.

use crate::dag::TaskName;
use crate::exec::SessionId;
use crate::types::WatchEventKind;

/// Why a task was triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerReason {
    /// Manual trigger (e.g. the initial build at startup).
    Manual,
    /// Triggered due to a filesystem event on `path` (relative to the root).
    FileWatch { path: String, kind: WatchEventKind },
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Succeeded,
    /// Display form of the error that aborted the session.
    Failed(String),
    Cancelled,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no session is active and nothing is
    /// queued.
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher, sessions, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task should be run in a new session.
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    /// A session started by the runtime has ended.
    SessionFinished {
        session: SessionId,
        outcome: SessionOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep, SessionTable};
pub use queue::TriggerQueue;
pub use crate::types::TriggerWhileRunningBehaviour;
pub use runtime::Runtime;
