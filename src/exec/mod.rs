// src/exec/mod.rs

//! Execution layer.
//!
//! - [`session`] defines run sessions and cancellation tokens.
//! - [`executor`] drives one session of the task graph on Tokio.
//! - [`process`] runs shell commands for command-backed collaborators.
//! - [`backend`] provides the `ExecutorBackend` trait used by the watch
//!   runtime, and a concrete `RealExecutorBackend`, which tests can replace
//!   with a fake implementation.

pub mod backend;
pub mod executor;
pub mod process;
pub mod session;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use executor::{Executor, SessionReport};
pub use session::{CancelToken, Session, SessionId};
