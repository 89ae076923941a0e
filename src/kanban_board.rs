use std::collections::HashSet;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use crate::task::{Column, Task};

/// The three fixed lists. Every list is always present, possibly empty.
/// A missing or `null` list reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Columns {
    #[serde(default, deserialize_with = "nullable")]
    pub todo: Vec<Task>,
    #[serde(default, deserialize_with = "nullable")]
    pub inprogress: Vec<Task>,
    #[serde(default, deserialize_with = "nullable")]
    pub done: Vec<Task>,
}

/// In-memory task collection, persisted as `{ "columns": { ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanbanBoard {
    #[serde(default, deserialize_with = "nullable")]
    pub columns: Columns,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl KanbanBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self, column: Column) -> &[Task] {
        match column {
            Column::Todo => &self.columns.todo,
            Column::InProgress => &self.columns.inprogress,
            Column::Done => &self.columns.done,
        }
    }

    fn tasks_mut(&mut self, column: Column) -> &mut Vec<Task> {
        match column {
            Column::Todo => &mut self.columns.todo,
            Column::InProgress => &mut self.columns.inprogress,
            Column::Done => &mut self.columns.done,
        }
    }

    /// Tasks of `column` whose due date is exactly `date`.
    pub fn get_tasks_due(&self, column: Column, date: &str) -> Vec<&Task> {
        self.tasks(column).iter().filter(|t| t.is_due_on(date)).collect()
    }

    pub fn len(&self) -> usize {
        Column::ALL.iter().map(|c| self.tasks(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_of(&self, id: &str) -> Option<Column> {
        Column::ALL
            .into_iter()
            .find(|c| self.tasks(*c).iter().any(|t| t.id == id))
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        Column::ALL
            .iter()
            .find_map(|c| self.tasks(*c).iter().find(|t| t.id == id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_task(id).is_some()
    }

    /// Appends `task` to `column`. Returns false when the id is already on the board.
    pub fn add_task(&mut self, column: Column, task: Task) -> bool {
        if self.contains(&task.id) {
            return false;
        }
        self.tasks_mut(column).push(task);
        true
    }

    /// Applies `f` to the task in place. Returns false when no such task exists.
    pub fn update_task<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Task),
    {
        let Some(column) = self.column_of(id) else {
            return false;
        };
        match self.tasks_mut(column).iter_mut().find(|t| t.id == id) {
            Some(task) => {
                f(task);
                true
            }
            None => false,
        }
    }

    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let column = self.column_of(id)?;
        let list = self.tasks_mut(column);
        let idx = list.iter().position(|t| t.id == id)?;
        Some(list.remove(idx))
    }

    /// Removes the task from `from` and appends it to `to`.
    ///
    /// No legality check happens here; callers gate drag-drop moves through
    /// [`crate::transition::is_legal`] first. Returns false when `from` does
    /// not hold the task.
    pub fn move_task(&mut self, id: &str, from: Column, to: Column) -> bool {
        let list = self.tasks_mut(from);
        let Some(idx) = list.iter().position(|t| t.id == id) else {
            return false;
        };
        let task = list.remove(idx);
        self.tasks_mut(to).push(task);
        true
    }

    /// Relocates the task to the end of done from whichever column holds it.
    pub fn mark_done(&mut self, id: &str) -> bool {
        match self.column_of(id) {
            Some(from) => self.move_task(id, from, Column::Done),
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        for column in Column::ALL {
            self.tasks_mut(column).clear();
        }
    }

    /// Drops every repeated id after its first occurrence (board order).
    /// Returns the ids that were dropped.
    pub fn dedup_ids(&mut self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();
        for column in Column::ALL {
            self.tasks_mut(column).retain(|t| {
                if seen.insert(t.id.clone()) {
                    true
                } else {
                    dropped.push(t.id.clone());
                    false
                }
            });
        }
        dropped
    }

    /// Generates an id not present on the board: epoch millis plus four
    /// base-36 characters.
    pub fn next_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let suffix: String = (0..4)
                .map(|_| {
                    let n = rng.gen_range(0..36u32);
                    char::from_digit(n, 36).unwrap_or('0')
                })
                .collect();
            let id = format!("{}{}", Utc::now().timestamp_millis(), suffix);
            if !self.contains(&id) {
                return id;
            }
        }
    }
}
