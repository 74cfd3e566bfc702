// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::{ExecutorBackend, Session, SessionId};

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drives watch-mode sessions in response to `RuntimeEvent`s, and delegates
/// actual session execution to an `ExecutorBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// dispatch semantics. This struct handles async IO: reading events from
/// channels, starting sessions and signalling their cancel tokens.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    sessions: HashMap<SessionId, Session>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
            sessions: HashMap::new(),
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (start, cancel, exit).
    pub async fn run(mut self) -> Result<()> {
        info!("assetflow watch runtime started");

        loop {
            let Some(event) = self.event_rx.recv().await else {
                info!("runtime event channel closed; exiting");
                break;
            };

            debug!(?event, "runtime received event");

            if let RuntimeEvent::SessionFinished { session, .. } = &event {
                self.sessions.remove(session);
            }

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartSession { task, session } => {
                let handle = Session::new(session);
                self.sessions.insert(session, handle.clone());
                self.executor.start_session(task, handle).await?;
            }
            CoreCommand::CancelSession(id) => match self.sessions.get(&id) {
                Some(session) => {
                    info!(session = %id, "cancelling running session");
                    session.cancel();
                }
                None => warn!(session = %id, "cancel requested for unknown session"),
            },
            CoreCommand::RequestExit => {
                info!("core issued RequestExit command");
            }
        }
        Ok(())
    }
}
