// src/engine/queue.rs

use std::collections::BTreeSet;

use tracing::debug;

use crate::engine::TaskName;
use crate::types::RebuildWhileRunning;

/// Triggers that arrive while a run of the same task is still in flight.
///
/// Semantics:
/// - In `Queue` mode, every trigger for a busy task collapses into one
///   pending follow-up run for that task, however many triggers arrive.
/// - In `Drop` mode, such triggers are discarded.
/// - Triggers for tasks that are not building never touch the queue; the core
///   starts those immediately.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: RebuildWhileRunning,
    pending: BTreeSet<TaskName>,
}

impl TriggerQueue {
    pub fn new(behaviour: RebuildWhileRunning) -> Self {
        Self {
            behaviour,
            pending: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Record a trigger for a task that is currently building.
    ///
    /// Returns `true` if the trigger was kept (or merged into an existing
    /// follow-up), `false` if it was dropped.
    pub fn record_trigger(&mut self, task: &str) -> bool {
        match self.behaviour {
            RebuildWhileRunning::Queue => {
                let inserted = self.pending.insert(task.to_string());
                debug!(
                    task = %task,
                    coalesced = !inserted,
                    "queued follow-up run while task is building"
                );
                true
            }
            RebuildWhileRunning::Drop => {
                debug!(task = %task, "dropping trigger while task is building");
                false
            }
        }
    }

    /// Take the pending follow-up for `task`, if there is one.
    pub fn take(&mut self, task: &str) -> bool {
        self.pending.remove(task)
    }

    /// Tasks with a pending follow-up, sorted by name.
    pub fn pending_tasks(&self) -> Vec<TaskName> {
        self.pending.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_mode_coalesces_repeated_triggers() {
        let mut q = TriggerQueue::new(RebuildWhileRunning::Queue);
        assert!(q.record_trigger("sass"));
        assert!(q.record_trigger("sass"));
        assert!(q.record_trigger("sass"));
        assert_eq!(q.pending_tasks(), vec!["sass".to_string()]);

        assert!(q.take("sass"));
        assert!(!q.take("sass"));
        assert!(q.is_empty());
    }

    #[test]
    fn drop_mode_keeps_nothing() {
        let mut q = TriggerQueue::new(RebuildWhileRunning::Drop);
        assert!(!q.record_trigger("browserify"));
        assert!(q.is_empty());
        assert!(!q.take("browserify"));
    }
}
