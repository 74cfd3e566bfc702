// src/dag/scheduler_step.rs

//! Step-by-step execution result types for the scheduler.

use crate::dag::task_info::ScheduledTask;
use crate::dag::TaskName;

/// Structured result of a single scheduler "step".
///
/// This is useful for tests that want to manually step a session and make
/// assertions about what changed.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Tasks that became ready to run as a result of this step.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// Tasks that were newly marked as failed in this step.
    pub newly_failed: Vec<TaskName>,
    /// Tasks that will never start because the session aborted.
    pub newly_skipped: Vec<TaskName>,
    /// Whether this step left every task of the session terminal.
    pub session_just_finished: bool,
}
