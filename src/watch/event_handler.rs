// src/watch/event_handler.rs

//! Turning raw `notify` events into task triggers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::Event;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::fs::FileSystem;
use crate::types::WatchEventKind;
use crate::watch::hash::{compute_file_hash, ContentHashes};
use crate::watch::patterns::{relative_str, WatchProfile};

/// Map a notify event kind onto the kinds that trigger a rebuild.
///
/// Removals, access and metadata-only changes never trigger. A rename is
/// treated like a creation of the destination path; the source side of a
/// rename (`RenameMode::From`) is a removal.
pub fn classify(kind: &EventKind) -> Option<WatchEventKind> {
    match kind {
        EventKind::Create(_) => Some(WatchEventKind::Created),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => None,
        EventKind::Modify(ModifyKind::Name(_)) => Some(WatchEventKind::Created),
        EventKind::Modify(_) => Some(WatchEventKind::Modified),
        _ => None,
    }
}

/// Filters file events against the watch profile and produces triggers.
#[derive(Debug)]
pub struct WatchFilter {
    root: PathBuf,
    profile: WatchProfile,
    fs: Arc<dyn FileSystem>,
    hashes: ContentHashes,
}

impl WatchFilter {
    pub fn new(root: impl Into<PathBuf>, profile: WatchProfile, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            profile,
            fs,
            hashes: ContentHashes::new(),
        }
    }

    /// Process one notify event, returning the trigger it produces, if any.
    ///
    /// One event triggers the task at most once. For a two-path rename only
    /// the destination (the last path) is considered.
    pub fn process_event(&mut self, event: &Event) -> Option<RuntimeEvent> {
        let kind = classify(&event.kind)?;

        if matches!(event.kind, EventKind::Modify(ModifyKind::Name(RenameMode::Both))) {
            let destination = event.paths.last()?;
            return self.process_path(destination, kind);
        }

        event
            .paths
            .iter()
            .find_map(|path| self.process_path(path, kind))
    }

    fn process_path(&mut self, path: &Path, kind: WatchEventKind) -> Option<RuntimeEvent> {
        // Directories, and paths already gone by the time the event arrives.
        if !self.fs.is_file(path) {
            return None;
        }

        let Some(rel) = relative_str(&self.root, path) else {
            warn!("could not relativize path {:?} against root {:?}", path, self.root);
            return None;
        };

        if !self.profile.matches(&rel) {
            return None;
        }

        if self.profile.use_hash() && !self.content_changed(path) {
            info!(path = %rel, "watched content unchanged; skipping trigger");
            return None;
        }

        debug!(path = %rel, kind = %kind, task = %self.profile.task(), "watch match -> triggering task");
        Some(RuntimeEvent::TaskTriggered {
            task: self.profile.task().to_string(),
            reason: TriggerReason::FileWatch { path: rel, kind },
        })
    }

    fn content_changed(&mut self, path: &Path) -> bool {
        match compute_file_hash(self.fs.as_ref(), path) {
            Ok(hash) => self.hashes.update(path, hash),
            Err(err) => {
                warn!(?path, error = %err, "failed to hash watched file; triggering anyway");
                true
            }
        }
    }
}
