use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Behaviour when a watch trigger arrives while a session is already running.
///
/// - `Queue`: remember the trigger and start a new session when the current
///   one finishes (default behaviour). Repeated triggers coalesce.
/// - `Cancel`: cancel the running session and start the latest trigger as
///   soon as it has stopped.
/// - `Parallel`: start an overlapping session right away. Both sessions write
///   the same outputs; whichever finishes last wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Cancel,
    Parallel,
}

impl FromStr for TriggerWhileRunningBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" => Ok(TriggerWhileRunningBehaviour::Queue),
            "cancel" => Ok(TriggerWhileRunningBehaviour::Cancel),
            "parallel" => Ok(TriggerWhileRunningBehaviour::Parallel),
            other => Err(format!(
                "invalid triggered_while_running_behaviour: {other} (expected \"queue\", \"cancel\" or \"parallel\")"
            )),
        }
    }
}

/// Filesystem event kinds that qualify for a rebuild. Deletions never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchEventKind {
    Created,
    Modified,
}

impl fmt::Display for WatchEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchEventKind::Created => f.write_str("added"),
            WatchEventKind::Modified => f.write_str("changed"),
        }
    }
}
