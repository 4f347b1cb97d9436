//! Task lifecycle: add, toggle and delete, with their effect on the XP total.
//!
//! Bad input (blank text, unknown day, unknown id) is never an error; the
//! operation just leaves the state untouched and says so through its return
//! value.

use crate::models::{AppData, Priority, Task};
use crate::ranks::{level_up, Rank};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

pub const MAX_TASK_TEXT_CHARS: usize = 200;

/// XP bookkeeping produced by completing or un-completing a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpChange {
    /// Nominal change, `+xp` on completion and `-xp` on un-completion.
    pub delta: i64,
    pub old_xp: u64,
    /// Total after the change; never below zero.
    pub new_xp: u64,
    pub completed: bool,
}

impl XpChange {
    fn apply(old_xp: u64, priority: Priority, completed: bool) -> Self {
        let xp = priority.xp();
        let (delta, new_xp) = if completed {
            (xp as i64, old_xp.saturating_add(xp))
        } else {
            (-(xp as i64), old_xp.saturating_sub(xp))
        };
        Self {
            delta,
            old_xp,
            new_xp,
            completed,
        }
    }

    pub fn level_up(&self) -> Option<&'static Rank> {
        level_up(self.old_xp, self.new_xp)
    }
}

impl AppData {
    pub fn add_task(
        &mut self,
        day: u8,
        text: &str,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Option<Task> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.next_task_id(now);
        let tasks = self.tasks.day_mut(day)?;

        let task = Task {
            id,
            text: text.chars().take(MAX_TASK_TEXT_CHARS).collect(),
            priority,
            completed: false,
            created_at: now,
        };
        tasks.push(task.clone());
        Some(task)
    }

    pub fn toggle_task(&mut self, day: u8, id: i64) -> Option<XpChange> {
        let task = self
            .tasks
            .day_mut(day)?
            .iter_mut()
            .find(|task| task.id == id)?;

        task.completed = !task.completed;
        let change = XpChange::apply(self.total_xp, task.priority, task.completed);
        self.total_xp = change.new_xp;
        Some(change)
    }

    /// Removes a task; a completed task takes its earned XP with it.
    pub fn delete_task(&mut self, day: u8, id: i64) -> Option<Task> {
        let tasks = self.tasks.day_mut(day)?;
        let index = tasks.iter().position(|task| task.id == id)?;
        let task = tasks.remove(index);

        if task.completed {
            self.total_xp = self.total_xp.saturating_sub(task.priority.xp());
        }
        Some(task)
    }

    pub fn find_task(&self, day: u8, id: i64) -> Option<&Task> {
        self.tasks.day(day)?.iter().find(|task| task.id == id)
    }

    pub fn day_counts(&self, day: u8) -> (usize, usize) {
        let tasks = self.tasks.day(day).unwrap_or_default();
        let completed = tasks.iter().filter(|task| task.completed).count();
        (completed, tasks.len())
    }

    /// Millisecond timestamp of `now`, moved past any id already in the week.
    /// When the largest id is `i64::MAX`, the smallest free non-negative id.
    fn next_task_id(&self, now: DateTime<Utc>) -> i64 {
        let candidate = now.timestamp_millis();
        let ids: BTreeSet<i64> = self.tasks.tasks().map(|task| task.id).collect();
        match ids.last() {
            Some(&max) if max >= candidate => max
                .checked_add(1)
                .or_else(|| (0..i64::MAX).find(|id| !ids.contains(id)))
                .unwrap_or(candidate),
            _ => candidate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap()
    }

    fn data() -> AppData {
        AppData::new("Mon Jan 01 2024")
    }

    #[test]
    fn add_appends_incomplete_task() {
        let mut data = data();
        let first = data.add_task(1, "Write report", Priority::Need, now()).unwrap();
        let second = data.add_task(1, "  Review PR  ", Priority::Basic, now()).unwrap();

        let day = data.tasks.day(1).unwrap();
        assert_eq!(day.len(), 2);
        assert_eq!(day[0], first);
        assert_eq!(day[1].text, "Review PR");
        assert!(!second.completed);
        assert_eq!(first.created_at, now());
        assert_eq!(data.total_xp, 0);
    }

    #[test]
    fn add_rejects_blank_text_and_unknown_day() {
        let mut data = data();
        assert!(data.add_task(1, "   ", Priority::Basic, now()).is_none());
        assert!(data.add_task(7, "Stretch", Priority::Basic, now()).is_none());
        assert_eq!(data.tasks.tasks().count(), 0);
    }

    #[test]
    fn add_truncates_long_text() {
        let mut data = data();
        let text = "x".repeat(MAX_TASK_TEXT_CHARS + 50);
        let task = data.add_task(2, &text, Priority::Basic, now()).unwrap();
        assert_eq!(task.text.chars().count(), MAX_TASK_TEXT_CHARS);
    }

    #[test]
    fn ids_stay_unique_within_the_same_millisecond() {
        let mut data = data();
        let a = data.add_task(0, "a", Priority::Basic, now()).unwrap();
        let b = data.add_task(3, "b", Priority::Basic, now()).unwrap();
        let c = data.add_task(3, "c", Priority::Basic, now()).unwrap();
        assert_eq!(a.id, now().timestamp_millis());
        assert!(b.id > a.id);
        assert!(c.id > b.id);
    }

    #[test]
    fn id_allocation_survives_maximum_stored_id() {
        let mut data = data();
        let stored = format!(
            r#"{{"1":[{{"id":{},"text":"imported","priority":"basic","completed":false,"createdAt":"2024-01-01T00:00:00Z"}}]}}"#,
            i64::MAX
        );
        data.tasks = serde_json::from_str(&stored).unwrap();

        let first = data.add_task(1, "next", Priority::Basic, now()).unwrap();
        let second = data.add_task(1, "after", Priority::Basic, now()).unwrap();
        assert_eq!(first.id, 0);
        assert_eq!(second.id, 1);

        let ids: BTreeSet<i64> = data.tasks.tasks().map(|task| task.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn toggle_twice_restores_completion_and_xp() {
        let mut data = data();
        let task = data.add_task(1, "Write report", Priority::Need, now()).unwrap();

        let change = data.toggle_task(1, task.id).unwrap();
        assert_eq!(change.delta, 200);
        assert!(change.completed);
        assert!(data.find_task(1, task.id).unwrap().completed);
        assert_eq!(data.total_xp, 200);

        let change = data.toggle_task(1, task.id).unwrap();
        assert_eq!(change.delta, -200);
        assert!(!data.find_task(1, task.id).unwrap().completed);
        assert_eq!(data.total_xp, 0);
    }

    #[test]
    fn uncompleting_never_drives_xp_negative() {
        let mut data = data();
        let task = data.add_task(4, "Deep work", Priority::Important, now()).unwrap();
        data.toggle_task(4, task.id);
        data.total_xp = 120;

        let change = data.toggle_task(4, task.id).unwrap();
        assert_eq!(change.delta, -300);
        assert_eq!(change.new_xp, 0);
        assert_eq!(data.total_xp, 0);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut data = data();
        let task = data.add_task(1, "Write report", Priority::Need, now()).unwrap();
        data.toggle_task(1, task.id);
        let before = data.clone();

        assert!(data.toggle_task(1, task.id + 1).is_none());
        assert!(data.toggle_task(2, task.id).is_none());
        assert!(data.toggle_task(9, task.id).is_none());
        assert!(data.delete_task(1, task.id + 1).is_none());
        assert!(data.delete_task(9, task.id).is_none());
        assert_eq!(data, before);
    }

    #[test]
    fn deleting_completed_task_revokes_xp_with_clamp() {
        let mut data = data();
        let task = data.add_task(5, "Ship it", Priority::Important, now()).unwrap();
        data.toggle_task(5, task.id);
        data.total_xp = 250;

        let removed = data.delete_task(5, task.id).unwrap();
        assert_eq!(removed.id, task.id);
        assert_eq!(data.total_xp, 0);
        assert!(data.tasks.day(5).unwrap().is_empty());
    }

    #[test]
    fn deleting_open_task_keeps_xp_and_order() {
        let mut data = data();
        let a = data.add_task(2, "a", Priority::Basic, now()).unwrap();
        let b = data.add_task(2, "b", Priority::Basic, now()).unwrap();
        let c = data.add_task(2, "c", Priority::Basic, now()).unwrap();
        data.total_xp = 700;

        data.delete_task(2, b.id).unwrap();
        let ids: Vec<i64> = data.tasks.day(2).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
        assert_eq!(data.total_xp, 700);
    }

    #[test]
    fn completing_past_threshold_signals_level_up() {
        let mut data = data();
        data.total_xp = 450;
        let task = data.add_task(3, "Gym", Priority::Basic, now()).unwrap();

        let change = data.toggle_task(3, task.id).unwrap();
        assert_eq!(data.total_xp, 550);
        assert_eq!(change.level_up().map(|rank| rank.level), Some(2));

        let change = data.toggle_task(3, task.id).unwrap();
        assert!(change.level_up().is_none());
    }

    #[test]
    fn day_counts_reflect_completion() {
        let mut data = data();
        let a = data.add_task(6, "a", Priority::Basic, now()).unwrap();
        data.add_task(6, "b", Priority::Need, now()).unwrap();
        data.toggle_task(6, a.id);
        assert_eq!(data.day_counts(6), (1, 2));
        assert_eq!(data.day_counts(0), (0, 0));
        assert_eq!(data.day_counts(11), (0, 0));
    }
}
