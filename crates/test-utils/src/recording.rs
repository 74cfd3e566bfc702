use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Barrier;

use assetflow::dag::{ActionFuture, TaskAction, TaskContext};
use assetflow::errors::AssetflowError;
use assetflow::exec::SessionId;

/// What a [`RecordingAction`] observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Started(String, SessionId),
    Finished(String, SessionId),
}

/// Shared, ordered log of action starts and finishes.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: LogEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Task names in start order.
    pub fn started(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::Started(name, _) => Some(name),
                LogEntry::Finished(..) => None,
            })
            .collect()
    }

    /// Task names in finish order.
    pub fn finished(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::Finished(name, _) => Some(name),
                LogEntry::Started(..) => None,
            })
            .collect()
    }

    /// Position of an entry in the log, if present.
    pub fn position(&self, entry: &LogEntry) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    /// How many times `task` was started (in any session).
    pub fn start_count(&self, task: &str) -> usize {
        self.started().iter().filter(|n| *n == task).count()
    }
}

/// Test action that records its start/finish into an [`EventLog`].
///
/// Can optionally sleep, wait on a barrier (to prove concurrency) or fail.
#[derive(Debug, Clone)]
pub struct RecordingAction {
    log: EventLog,
    delay: Duration,
    fail: bool,
    barrier: Option<Arc<Barrier>>,
}

impl RecordingAction {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            delay: Duration::ZERO,
            fail: false,
            barrier: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }
}

impl TaskAction for RecordingAction {
    fn run(&self, ctx: TaskContext) -> ActionFuture<'_> {
        Box::pin(async move {
            self.log.push(LogEntry::Started(ctx.task.clone(), ctx.session));

            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            if self.fail {
                return Err(AssetflowError::Other(anyhow::anyhow!("{} failed on purpose", ctx.task)));
            }

            self.log.push(LogEntry::Finished(ctx.task.clone(), ctx.session));
            Ok(())
        })
    }
}
