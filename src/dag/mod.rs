// src/dag/mod.rs

//! Task graph representation and per-session scheduling.
//!
//! - [`task`] defines tasks and the [`TaskAction`] trait.
//! - [`graph`] holds the registry of tasks and validates it as a DAG.
//! - [`scheduler`] contains the per-session state machine that decides
//!   which tasks are ready to run.
//! - [`task_info`] provides per-session state and scheduled task types.
//! - [`scheduler_step`] defines the result type for scheduler steps.
//! - [`state_manager`] manages per-session state transitions.

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task;
pub mod task_info;

pub use graph::TaskGraph;
pub use scheduler::{Scheduler, TaskOutcome};
pub use scheduler_step::SchedulerStep;
pub use task::{action_fn, ActionFuture, NoopAction, Task, TaskAction, TaskContext};
pub use task_info::{ScheduledTask, TaskRunState};
