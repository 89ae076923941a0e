use chrono::{Local, NaiveDate};

use crate::error::{FormError, StoreError};
use crate::form::{format_date, Submitted, TaskForm};
use crate::kanban_board::KanbanBoard;
use crate::render::{self, BoardView};
use crate::store::BoardStore;
use crate::task::Column;
use crate::transition;
use crate::view::{Editability, ViewMode, ViewPolicy, ViewState};

/// A user intent, decoupled from whichever surface produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SetMode(ViewMode),
    SelectDate(Option<NaiveDate>),
    /// todo -> inprogress shortcut.
    Start(String),
    /// Mark-done shortcut; moves from any column.
    Complete(String),
    Delete { id: String, confirmed: bool },
    /// Drag-and-drop move; gated by mode and legality graph.
    Move { id: String, from: Column, to: Column },
    Submit(TaskForm),
    ClearAll { confirmed: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The board was mutated and persisted.
    Changed,
    /// Only the view state changed.
    ViewChanged,
    /// Nothing happened.
    Ignored,
    /// The submission was refused; state is untouched.
    Rejected(FormError),
}

/// Owns all application state and runs the `mutate -> persist -> render` cycle.
pub struct App {
    board: KanbanBoard,
    view: ViewState,
    store: BoardStore,
    clock: Box<dyn Fn() -> NaiveDate>,
}

impl App {
    /// Loads the board from `store`, using the local calendar date as today.
    pub fn load(store: BoardStore) -> Self {
        Self::with_clock(store, || Local::now().date_naive())
    }

    pub fn with_clock<F>(store: BoardStore, clock: F) -> Self
    where
        F: Fn() -> NaiveDate + 'static,
    {
        let board = store.load();
        Self {
            board,
            view: ViewState::default(),
            store,
            clock: Box::new(clock),
        }
    }

    pub fn board(&self) -> &KanbanBoard {
        &self.board
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn render(&self) -> BoardView {
        render::build(&self.board, &self.view, self.today())
    }

    /// Add form for the current view, or `None` when adding is not offered.
    pub fn new_form(&self) -> Option<TaskForm> {
        self.view
            .policy()
            .add_enabled()
            .then(|| TaskForm::for_new(&self.view, self.today()))
    }

    /// Edit form for `id`, or `None` when the view does not allow edits or
    /// does not show the task.
    pub fn edit_form(&self, id: &str) -> Option<TaskForm> {
        match self.editability() {
            Some(Editability::Full) | Some(Editability::EditDelete) if self.is_visible(id) => {
                TaskForm::for_edit(&self.board, id, self.today())
            }
            _ => None,
        }
    }

    /// True when the current view renders a card for `id`: its column is
    /// shown and its due date is the date the view is filtered by.
    pub fn is_visible(&self, id: &str) -> bool {
        let policy = self.view.policy();
        let ViewPolicy::Columns { filter, .. } = &policy else {
            return false;
        };
        let date = format_date(filter.resolve(self.today()));
        match (self.board.column_of(id), self.board.find_task(id)) {
            (Some(column), Some(task)) => policy.shows(column) && task.is_due_on(&date),
            _ => false,
        }
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<Outcome, StoreError> {
        tracing::debug!(?intent, mode = %self.view.mode(), "dispatch");
        let outcome = match intent {
            Intent::SetMode(mode) => {
                self.view.set_mode(mode);
                Outcome::ViewChanged
            }
            Intent::SelectDate(date) => {
                if self.view.select_date(date) {
                    Outcome::ViewChanged
                } else {
                    Outcome::Ignored
                }
            }
            Intent::Start(id) => self.start(&id),
            Intent::Complete(id) => self.complete(&id),
            Intent::Delete { id, confirmed } => self.delete(&id, confirmed),
            Intent::Move { id, from, to } => self.attempt_move(&id, from, to),
            Intent::Submit(form) => self.submit(&form),
            Intent::ClearAll { confirmed } => self.clear_all(confirmed),
        };

        if outcome == Outcome::Changed {
            if let Err(e) = self.store.save(&self.board) {
                tracing::error!(error = %e, "save failed, reverting to stored board");
                self.board = self.store.load();
                return Err(e);
            }
        }
        Ok(outcome)
    }

    fn editability(&self) -> Option<Editability> {
        self.view.policy().editability()
    }

    fn start(&mut self, id: &str) -> Outcome {
        if self.editability() != Some(Editability::Full) || !self.is_visible(id) {
            return Outcome::Ignored;
        }
        if self.board.move_task(id, Column::Todo, Column::InProgress) {
            tracing::info!(id, "task started");
            Outcome::Changed
        } else {
            Outcome::Ignored
        }
    }

    fn complete(&mut self, id: &str) -> Outcome {
        if self.editability() != Some(Editability::Full) || !self.is_visible(id) {
            return Outcome::Ignored;
        }
        if self.board.mark_done(id) {
            tracing::info!(id, "task marked done");
            Outcome::Changed
        } else {
            Outcome::Ignored
        }
    }

    fn delete(&mut self, id: &str, confirmed: bool) -> Outcome {
        if !confirmed {
            return Outcome::Ignored;
        }
        match self.editability() {
            Some(Editability::Full) | Some(Editability::EditDelete) if self.is_visible(id) => {}
            _ => return Outcome::Ignored,
        }
        match self.board.delete_task(id) {
            Some(task) => {
                tracing::info!(id, title = %task.title, "task deleted");
                Outcome::Changed
            }
            None => Outcome::Ignored,
        }
    }

    fn attempt_move(&mut self, id: &str, from: Column, to: Column) -> Outcome {
        if self.view.mode() != ViewMode::Today || !self.view.policy().drag_drop() {
            tracing::debug!(id, %from, %to, "move ignored outside today view");
            return Outcome::Ignored;
        }
        if !self.is_visible(id) {
            tracing::debug!(id, "move ignored for task not in view");
            return Outcome::Ignored;
        }
        if !transition::is_legal(from, to) {
            tracing::debug!(id, %from, %to, "illegal move ignored");
            return Outcome::Ignored;
        }
        if self.board.move_task(id, from, to) {
            tracing::info!(id, %from, %to, "task moved");
            Outcome::Changed
        } else {
            Outcome::Ignored
        }
    }

    fn submit(&mut self, form: &TaskForm) -> Outcome {
        let allowed = match form.id.as_deref().filter(|_| form.is_edit()) {
            Some(id) if self.board.contains(id.trim()) => {
                self.editability().is_some_and(|e| e != Editability::ReadOnly)
                    && self.is_visible(id.trim())
            }
            // unknown id: let the form report it
            Some(_) => true,
            None => self.view.policy().add_enabled(),
        };
        if !allowed {
            return Outcome::Ignored;
        }
        match form.submit(&mut self.board) {
            Ok(Submitted::Added { id, column }) => {
                tracing::info!(%id, %column, "task added");
                Outcome::Changed
            }
            Ok(Submitted::Updated { id, moved }) => {
                tracing::info!(%id, ?moved, "task updated");
                Outcome::Changed
            }
            Err(e) => {
                tracing::debug!(error = %e, "form rejected");
                Outcome::Rejected(e)
            }
        }
    }

    fn clear_all(&mut self, confirmed: bool) -> Outcome {
        if !confirmed {
            return Outcome::Ignored;
        }
        self.board.clear_all();
        tracing::info!("board cleared");
        Outcome::Changed
    }
}
