// src/exec/backend.rs

//! Pluggable session backend abstraction.
//!
//! The watch runtime talks to an `ExecutorBackend` instead of the executor
//! directly. This makes it easy to swap in a fake backend in tests while
//! keeping the production implementation here.
//!
//! - `RealExecutorBackend` spawns each session onto Tokio, runs it through
//!   the shared [`Executor`] and reports `SessionFinished` back to the
//!   runtime.
//! - Tests can provide their own `ExecutorBackend` that, for example, records
//!   which sessions were started and immediately reports them finished.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::dag::TaskName;
use crate::engine::{RuntimeEvent, SessionOutcome};
use crate::errors::{AssetflowError, Result};

use super::executor::Executor;
use super::session::Session;

/// Trait abstracting how sessions are executed.
pub trait ExecutorBackend: Send {
    /// Start `task` in `session`.
    ///
    /// Implementations must eventually send exactly one
    /// `RuntimeEvent::SessionFinished` for the session.
    fn start_session(
        &mut self,
        task: TaskName,
        session: Session,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real backend used in production.
pub struct RealExecutorBackend {
    executor: Arc<Executor>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealExecutorBackend {
    pub fn new(executor: Arc<Executor>, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            executor,
            runtime_tx,
        }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn start_session(
        &mut self,
        task: TaskName,
        session: Session,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone handles so the spawned session doesn't borrow `self`.
        let executor = Arc::clone(&self.executor);
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let id = session.id();
                let outcome = match executor.run(&task, &session).await {
                    Ok(report) => {
                        info!(
                            task = %task,
                            session = %id,
                            tasks = report.completed.len(),
                            "session succeeded"
                        );
                        SessionOutcome::Succeeded
                    }
                    Err(AssetflowError::Cancelled(_)) => SessionOutcome::Cancelled,
                    Err(err) => {
                        error!(task = %task, session = %id, error = %err, "session failed");
                        SessionOutcome::Failed(err.to_string())
                    }
                };

                if let Err(err) = tx
                    .send(RuntimeEvent::SessionFinished {
                        session: id,
                        outcome,
                    })
                    .await
                {
                    warn!(session = %id, "failed to report session completion: {err}");
                }
            });
            Ok(())
        })
    }
}
