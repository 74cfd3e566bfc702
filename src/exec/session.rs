// src/exec/session.rs

//! Run sessions and their cancellation tokens.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Identifier of one `Executor::run` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cloneable cancellation flag shared by a session and its task actions.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once [`CancelToken::cancel`] has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender gone without cancelling: never resolves.
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Explicit run-session token passed to `Executor::run`.
///
/// Prerequisite completion is tracked per session, so two overlapping runs
/// never share "already satisfied" state.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    cancel: CancelToken,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            cancel: CancelToken::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}
