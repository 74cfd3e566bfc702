use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use assetflow::dag::TaskName;
use assetflow::engine::{RuntimeEvent, SessionOutcome};
use assetflow::errors::Result;
use assetflow::exec::{ExecutorBackend, Session};

/// A fake session backend that:
/// - records which sessions were started (and keeps their handles, so tests
///   can check whether they were cancelled)
/// - optionally reports `SessionFinished(Succeeded)` right away.
///
/// With `auto_finish = false` the test drives completion itself by sending
/// `RuntimeEvent::SessionFinished`.
pub struct FakeSessionBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    started: Arc<Mutex<Vec<(TaskName, Session)>>>,
    auto_finish: bool,
}

impl FakeSessionBackend {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        started: Arc<Mutex<Vec<(TaskName, Session)>>>,
        auto_finish: bool,
    ) -> Self {
        Self {
            runtime_tx,
            started,
            auto_finish,
        }
    }
}

impl ExecutorBackend for FakeSessionBackend {
    fn start_session(
        &mut self,
        task: TaskName,
        session: Session,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let started = Arc::clone(&self.started);
        let auto_finish = self.auto_finish;

        Box::pin(async move {
            let id = session.id();
            {
                let mut guard = started.lock().unwrap();
                guard.push((task, session));
            }

            if auto_finish {
                tx.send(RuntimeEvent::SessionFinished {
                    session: id,
                    outcome: SessionOutcome::Succeeded,
                })
                .await
                .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
