// src/dag/task.rs

//! Task definitions: a name, prerequisite names and an action.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::Result;
use crate::exec::{CancelToken, SessionId};

use super::TaskName;

/// Boxed future returned by [`TaskAction::run`].
pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// What a task actually does.
///
/// Actions are shared across sessions, so anything they mutate must be
/// naturally idempotent (cleaning, transforming, rewriting a file).
pub trait TaskAction: Send + Sync {
    fn run(&self, ctx: TaskContext) -> ActionFuture<'_>;
}

/// Per-invocation context handed to an action.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub task: TaskName,
    pub session: SessionId,
    /// Fired when the owning session is cancelled.
    pub cancel: CancelToken,
}

/// Adapter turning an async closure into a [`TaskAction`].
pub struct FnAction<F>(F);

impl<F, Fut> TaskAction for FnAction<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn run(&self, ctx: TaskContext) -> ActionFuture<'_> {
        Box::pin((self.0)(ctx))
    }
}

/// Build a shareable action from an async closure.
pub fn action_fn<F, Fut>(f: F) -> Arc<dyn TaskAction>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnAction(f))
}

/// Action for composite tasks that only group prerequisites.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAction;

impl TaskAction for NoopAction {
    fn run(&self, _ctx: TaskContext) -> ActionFuture<'_> {
        Box::pin(async { Ok(()) })
    }
}

/// A registered task. Immutable after registration.
#[derive(Clone)]
pub struct Task {
    pub name: TaskName,
    pub prerequisites: Vec<TaskName>,
    pub description: Option<String>,
    pub(crate) action: Arc<dyn TaskAction>,
}

impl Task {
    pub fn new(
        name: impl Into<TaskName>,
        prerequisites: Vec<TaskName>,
        action: Arc<dyn TaskAction>,
    ) -> Self {
        Self {
            name: name.into(),
            prerequisites,
            description: None,
            action,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn action(&self) -> Arc<dyn TaskAction> {
        Arc::clone(&self.action)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("prerequisites", &self.prerequisites)
            .finish_non_exhaustive()
    }
}
