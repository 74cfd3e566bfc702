// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling `[watch]` glob patterns (also reused for source discovery).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Optionally hashing file contents so that saves without changes do not
//!   trigger a rebuild.
//!
//! It does **not** know about tasks or sessions; it only turns filesystem
//! changes into triggers for the watch runtime.

pub mod event_handler;
pub mod hash;
pub mod patterns;
pub mod watcher;

pub use event_handler::{classify, WatchFilter};
pub use hash::{compute_file_hash, ContentHashes};
pub use patterns::{
    build_globset, collect_matching_files, glob_base, relative_str, PatternSet, WatchProfile,
};
pub use watcher::{spawn_watcher, WatcherHandle};
