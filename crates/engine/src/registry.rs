#![forbid(unsafe_code)]

use crate::domain::{ScheduleMode, ScheduledTask, TaskId};
use std::time::SystemTime;

/// In-memory store of pending kills, in insertion order. The registry
/// enforces no ordering constraint on deadlines; a deadline in the past is
/// simply due on the next evaluation.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<ScheduledTask>,
    next_id: u64,
}

impl TaskRegistry {
    /// Create a task and return its fresh id.
    pub fn schedule(
        &mut self,
        pid: i32,
        name: impl Into<String>,
        deadline: SystemTime,
        mode: ScheduleMode,
    ) -> TaskId {
        let id = TaskId::new(self.next_id);
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            id,
            pid,
            name: name.into(),
            deadline,
            mode,
        });
        id
    }

    /// Remove a task. Returns whether it was present; cancelling an unknown
    /// id is a no-op.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.tasks.iter().position(|task| task.id == id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Tasks whose deadline has been reached, in insertion order. The tasks
    /// stay registered; the caller removes each once it is resolved.
    pub fn due_tasks(&self, now: SystemTime) -> Vec<ScheduledTask> {
        self.tasks
            .iter()
            .filter(|task| task.deadline <= now)
            .cloned()
            .collect()
    }

    /// Full current contents, insertion order.
    pub fn tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn ids_are_unique_and_stable() {
        let mut registry = TaskRegistry::default();
        let a = registry.schedule(1, "a", at(10), ScheduleMode::Timer);
        let b = registry.schedule(2, "b", at(5), ScheduleMode::Clock);
        assert_ne!(a, b);
        assert_eq!(registry.get(a).unwrap().pid, 1);
        assert_eq!(registry.get(b).unwrap().pid, 2);
    }

    #[test]
    fn due_tasks_keep_insertion_order_not_deadline_order() {
        let mut registry = TaskRegistry::default();
        registry.schedule(1, "late", at(100), ScheduleMode::Clock);
        registry.schedule(2, "early", at(1), ScheduleMode::Clock);
        let due = registry.due_tasks(at(200));
        let names: Vec<_> = due.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["late", "early"]);
    }

    #[test]
    fn due_tasks_does_not_remove() {
        let mut registry = TaskRegistry::default();
        registry.schedule(1, "a", at(1), ScheduleMode::Timer);
        assert_eq!(registry.due_tasks(at(2)).len(), 1);
        assert_eq!(registry.due_tasks(at(2)).len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn past_deadline_is_immediately_due() {
        let mut registry = TaskRegistry::default();
        registry.schedule(1, "a", at(1), ScheduleMode::Clock);
        assert_eq!(registry.due_tasks(at(1)).len(), 1);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut registry = TaskRegistry::default();
        let id = registry.schedule(1, "a", at(1), ScheduleMode::Timer);
        assert!(registry.cancel(id));
        assert!(!registry.cancel(id));
        assert!(registry.due_tasks(at(100)).is_empty());
        assert!(registry.tasks().is_empty());
    }

    proptest! {
        #[test]
        fn due_iff_deadline_reached(
            deadlines in prop::collection::vec(0u64..10_000, 0..100),
            now in 0u64..10_000,
        ) {
            let mut registry = TaskRegistry::default();
            for (pid, deadline) in deadlines.iter().enumerate() {
                registry.schedule(pid as i32, "p", at(*deadline), ScheduleMode::Clock);
            }

            let due: Vec<_> = registry.due_tasks(at(now));
            for task in registry.tasks() {
                let expected = task.deadline <= at(now);
                prop_assert_eq!(due.iter().any(|d| d.id == task.id), expected);
            }
        }

        #[test]
        fn cancelled_tasks_never_reappear(
            count in 1usize..50,
            cancel_index in 0usize..50,
        ) {
            let mut registry = TaskRegistry::default();
            let ids: Vec<_> = (0..count)
                .map(|pid| registry.schedule(pid as i32, "p", at(0), ScheduleMode::Timer))
                .collect();

            let victim = ids[cancel_index % count];
            prop_assert!(registry.cancel(victim));
            prop_assert!(registry.due_tasks(at(1_000)).iter().all(|t| t.id != victim));
            prop_assert!(registry.tasks().iter().all(|t| t.id != victim));
            prop_assert_eq!(registry.len(), count - 1);
        }
    }
}
