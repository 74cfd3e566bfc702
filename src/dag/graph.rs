// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{AssetflowError, Result};

use super::TaskName;
use super::task::{Task, TaskAction};

/// Registry of all tasks and their prerequisite edges.
///
/// Registration only rejects duplicate names. Prerequisites may be declared
/// before they are registered; [`TaskGraph::validate`] checks that every name
/// resolves and that the edges form a DAG.
#[derive(Debug, Default, Clone)]
pub struct TaskGraph {
    tasks: BTreeMap<TaskName, Task>,
}

/// Traversal marks for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. Fails with `DuplicateTask` if the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<TaskName>,
        prerequisites: &[&str],
        action: Arc<dyn TaskAction>,
    ) -> Result<()> {
        let prerequisites = prerequisites.iter().map(|p| p.to_string()).collect();
        self.register_task(Task::new(name, prerequisites, action))
    }

    /// Add a fully built [`Task`].
    pub fn register_task(&mut self, task: Task) -> Result<()> {
        if self.tasks.contains_key(&task.name) {
            return Err(AssetflowError::DuplicateTask(task.name));
        }

        debug!(task = %task.name, prerequisites = ?task.prerequisites, "registered task");

        self.tasks.insert(task.name.clone(), task);
        Ok(())
    }

    /// Finalise the graph: every prerequisite must be registered and the
    /// prerequisite edges must not contain a cycle.
    pub fn validate(&self) -> Result<()> {
        for (name, task) in &self.tasks {
            for prerequisite in &task.prerequisites {
                if !self.tasks.contains_key(prerequisite) {
                    return Err(AssetflowError::UnknownPrerequisite {
                        task: name.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }

        let mut marks: HashMap<&str, Mark> = HashMap::new();
        for name in self.tasks.keys() {
            let mut path = Vec::new();
            self.visit(name, &mut marks, &mut path)?;
        }
        Ok(())
    }

    /// Depth-first visit. `path` is the chain of in-progress tasks; reaching
    /// a task already on it closes a cycle.
    fn visit<'a>(
        &'a self,
        name: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
    ) -> Result<()> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<TaskName> =
                    path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Err(AssetflowError::CyclicDependency(cycle));
            }
            None => {}
        }

        marks.insert(name, Mark::InProgress);
        path.push(name);

        for prerequisite in self.prerequisites_of(name) {
            self.visit(prerequisite, marks, path)?;
        }

        path.pop();
        marks.insert(name, Mark::Done);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// All task names, sorted.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Immediate prerequisites of a task.
    pub fn prerequisites_of(&self, name: &str) -> &[TaskName] {
        self.tasks
            .get(name)
            .map(|t| t.prerequisites.as_slice())
            .unwrap_or(&[])
    }

    /// `entry` plus every transitive prerequisite.
    pub fn closure(&self, entry: &str) -> Result<BTreeSet<TaskName>> {
        if !self.contains(entry) {
            return Err(AssetflowError::TaskNotFound(entry.to_string()));
        }

        let mut seen = BTreeSet::new();
        let mut stack = vec![entry.to_string()];
        while let Some(name) = stack.pop() {
            if !seen.insert(name.clone()) {
                continue;
            }
            stack.extend(self.prerequisites_of(&name).iter().cloned());
        }
        Ok(seen)
    }
}
