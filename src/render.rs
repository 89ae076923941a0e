//! Declarative description of the board for a given view.
//!
//! [`build`] is pure: the terminal UI and the `list` command both draw from
//! the [`BoardView`] it returns.

use chrono::NaiveDate;
use serde::Serialize;

use crate::form::format_date;
use crate::kanban_board::KanbanBoard;
use crate::task::{Column, Priority, Task};
use crate::view::{Editability, ViewMode, ViewPolicy, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardAction {
    Start,
    Done,
    Edit,
    Delete,
}

impl CardAction {
    pub fn label(self) -> &'static str {
        match self {
            CardAction::Start => "Start",
            CardAction::Done => "Mark Done",
            CardAction::Edit => "Edit",
            CardAction::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_label: String,
    pub priority: Priority,
    pub actions: Vec<CardAction>,
    /// Read-only status badge, set only in read-only views.
    pub badge: Option<&'static str>,
    pub draggable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub column: Column,
    pub heading: String,
    pub cards: Vec<CardView>,
    pub drop_target: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Body {
    Placeholder { heading: String, message: String },
    Columns { date: String, columns: Vec<ColumnView> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolbar {
    pub active_mode: String,
    pub date_picker_enabled: bool,
    pub selected_date: Option<String>,
    pub add_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub toolbar: Toolbar,
    pub body: Body,
}

impl BoardView {
    pub fn columns(&self) -> &[ColumnView] {
        match &self.body {
            Body::Columns { columns, .. } => columns.as_slice(),
            Body::Placeholder { .. } => &[],
        }
    }

    pub fn column(&self, column: Column) -> Option<&ColumnView> {
        self.columns().iter().find(|c| c.column == column)
    }
}

pub const EMPTY_COLUMN: &str = "No tasks";
pub const NO_DUE: &str = "No due";

/// Rebuilds the full view from scratch.
pub fn build(board: &KanbanBoard, view: &ViewState, today: NaiveDate) -> BoardView {
    let policy = view.policy();
    let toolbar = Toolbar {
        active_mode: view.mode().to_string(),
        date_picker_enabled: view.mode() != ViewMode::Today,
        selected_date: view.selected_date().map(format_date),
        add_visible: policy.add_enabled(),
    };

    let body = match policy {
        ViewPolicy::Placeholder { mode } => Body::Placeholder {
            heading: format!("{} — select a date", mode.label()),
            message: "Choose a date from the date picker to view tasks.".into(),
        },
        ViewPolicy::Columns {
            columns,
            filter,
            editability,
            drag_drop,
            ..
        } => {
            let date = format_date(filter.resolve(today));
            let columns = columns
                .into_iter()
                .map(|column| {
                    let cards: Vec<CardView> = board
                        .get_tasks_due(column, &date)
                        .into_iter()
                        .map(|task| card(task, column, editability, drag_drop))
                        .collect();
                    ColumnView {
                        column,
                        heading: format!("{} ({})", column.title(), cards.len()),
                        cards,
                        drop_target: drag_drop,
                    }
                })
                .collect();
            Body::Columns { date, columns }
        }
    };

    BoardView { toolbar, body }
}

fn card(task: &Task, column: Column, editability: Editability, draggable: bool) -> CardView {
    let (actions, badge) = match editability {
        Editability::Full => {
            let mut actions = Vec::with_capacity(4);
            if column == Column::Todo {
                actions.push(CardAction::Start);
            }
            if column != Column::Done {
                actions.push(CardAction::Done);
            }
            actions.extend([CardAction::Edit, CardAction::Delete]);
            (actions, None)
        }
        Editability::EditDelete => (vec![CardAction::Edit, CardAction::Delete], None),
        Editability::ReadOnly => (Vec::new(), Some(column.badge())),
    };

    CardView {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        due_label: task.due().unwrap_or(NO_DUE).to_string(),
        priority: task.priority,
        actions,
        badge,
        draggable,
    }
}
