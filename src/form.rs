use chrono::NaiveDate;

use crate::error::FormError;
use crate::kanban_board::KanbanBoard;
use crate::task::{Column, Priority, Task};
use crate::view::{ViewMode, ViewState};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Field values of the add/edit modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    /// `None` adds a new task, `Some` edits an existing one.
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub due: String,
    pub priority: Priority,
    pub status: Column,
}

/// What a successful submit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Added { id: String, column: Column },
    Updated { id: String, moved: Option<(Column, Column)> },
}

impl TaskForm {
    /// Blank add form. Due date is the selected date in future mode, else today.
    pub fn for_new(view: &ViewState, today: NaiveDate) -> TaskForm {
        let due = match (view.mode(), view.selected_date()) {
            (ViewMode::Future, Some(date)) => date,
            _ => today,
        };
        TaskForm {
            id: None,
            title: String::new(),
            description: String::new(),
            due: format_date(due),
            priority: Priority::Medium,
            status: Column::Todo,
        }
    }

    /// Form pre-filled from an existing task; `None` when the id is unknown.
    pub fn for_edit(board: &KanbanBoard, id: &str, today: NaiveDate) -> Option<TaskForm> {
        let task = board.find_task(id)?;
        let status = board.column_of(id).unwrap_or(Column::Todo);
        Some(TaskForm {
            id: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            due: task.due().map_or_else(|| format_date(today), str::to_string),
            priority: task.priority,
            status,
        })
    }

    pub fn is_edit(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }

    /// Applies the form to the board.
    ///
    /// A changed status on an edit moves the task without consulting the
    /// drag-and-drop legality graph.
    pub fn submit(&self, board: &mut KanbanBoard) -> Result<Submitted, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::EmptyTitle);
        }
        let description = self.description.trim().to_string();
        let due = self.due.trim().to_string();

        match self.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                let current = board
                    .column_of(id)
                    .ok_or_else(|| FormError::UnknownTask(id.to_string()))?;
                board.update_task(id, |task| {
                    task.title = title.to_string();
                    task.description = description;
                    task.due = due;
                    task.priority = self.priority;
                });
                let moved = if current != self.status {
                    board.move_task(id, current, self.status);
                    Some((current, self.status))
                } else {
                    None
                };
                Ok(Submitted::Updated {
                    id: id.to_string(),
                    moved,
                })
            }
            None => {
                let id = board.next_id();
                let task = Task {
                    id: id.clone(),
                    title: title.to_string(),
                    description,
                    due,
                    priority: self.priority,
                };
                board.add_task(self.status, task);
                Ok(Submitted::Added {
                    id,
                    column: self.status,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn new_form(title: &str, status: Column) -> TaskForm {
        TaskForm {
            title: title.into(),
            status,
            ..TaskForm::for_new(&ViewState::default(), today())
        }
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut board = KanbanBoard::new();
        assert_eq!(new_form("   ", Column::Todo).submit(&mut board), Err(FormError::EmptyTitle));
        assert!(board.is_empty());
    }

    #[test]
    fn new_task_lands_in_selected_column() {
        let mut board = KanbanBoard::new();
        let Submitted::Added { id, column } =
            new_form("  Write report ", Column::InProgress).submit(&mut board).unwrap()
        else {
            panic!("expected add");
        };
        assert_eq!(column, Column::InProgress);
        let task = board.find_task(&id).unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.due, "2024-01-01");
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn future_view_prefills_selected_date() {
        let mut view = ViewState::new(ViewMode::Future);
        let date = NaiveDate::from_ymd_opt(2030, 5, 6).unwrap();
        view.select_date(Some(date));
        assert_eq!(TaskForm::for_new(&view, today()).due, "2030-05-06");
    }

    #[test]
    fn edit_moves_without_legality_check() {
        let mut board = KanbanBoard::new();
        let Submitted::Added { id, .. } = new_form("ship", Column::Done).submit(&mut board).unwrap() else {
            panic!("expected add");
        };
        let mut form = TaskForm::for_edit(&board, &id, today()).unwrap();
        assert_eq!(form.status, Column::Done);
        form.status = Column::Todo;
        form.title = "ship it".into();
        form.priority = Priority::High;
        let result = form.submit(&mut board).unwrap();
        assert_eq!(
            result,
            Submitted::Updated {
                id: id.clone(),
                moved: Some((Column::Done, Column::Todo)),
            }
        );
        assert_eq!(board.column_of(&id), Some(Column::Todo));
        assert_eq!(board.find_task(&id).unwrap().title, "ship it");
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn edit_of_undated_task_prefills_today() {
        let mut board = KanbanBoard::new();
        board.add_task(
            Column::Todo,
            Task {
                id: "x".into(),
                title: "t".into(),
                description: String::new(),
                due: String::new(),
                priority: Priority::Low,
            },
        );
        let form = TaskForm::for_edit(&board, "x", today()).unwrap();
        assert_eq!(form.due, "2024-01-01");
        assert!(form.is_edit());
    }

    #[test]
    fn edit_of_unknown_task_fails() {
        let mut board = KanbanBoard::new();
        let form = TaskForm {
            id: Some("missing".into()),
            ..new_form("t", Column::Todo)
        };
        assert_eq!(
            form.submit(&mut board),
            Err(FormError::UnknownTask("missing".into()))
        );
    }
}
