use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::app::{App, Intent, Outcome};
use crate::error::AppError;
use crate::render::{Body, BoardView, CardView, EMPTY_COLUMN, NO_DUE};
use crate::task::{Column, Priority};
use crate::view::ViewMode;

#[derive(Parser, Debug)]
#[command(name = "taskers", about = "Personal task board: to do, in progress, done", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Board file to use instead of the configured one
    #[arg(long, global = true)]
    pub board: Option<PathBuf>,

    /// Configuration file (default: <config dir>/taskers/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the board for a view
    List(ListArgs),
    /// Add a task
    Add(AddArgs),
    /// Edit a task's fields; a new status moves it to that column
    Edit(EditArgs),
    /// Move a task from to do to in progress
    Start { id: String },
    /// Move a task to done
    Done { id: String },
    /// Move a task between columns (todo->inprogress, todo->done, inprogress->done)
    Move { id: String, to: Column },
    /// Delete a task
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Delete every task
    Clear {
        /// Confirm clearing the board
        #[arg(long)]
        yes: bool,
    },
}

/// The view a command acts through. Only tasks that view shows can be changed.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// today, future or past
    #[arg(long, default_value = "today")]
    pub mode: ViewMode,
    /// Date for future/past views (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub view: ViewArgs,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub title: String,
    #[arg(long, short)]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long, short, default_value = "medium")]
    pub priority: Priority,
    #[arg(long, short, default_value = "todo")]
    pub status: Column,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, short)]
    pub description: Option<String>,
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long, short)]
    pub priority: Option<Priority>,
    #[arg(long, short)]
    pub status: Option<Column>,
    #[command(flatten)]
    pub view: ViewArgs,
}

/// Runs a non-interactive command against `app`, writing results to `out`.
pub fn run_command<W: Write>(command: Commands, app: &mut App, out: &mut W) -> Result<(), AppError> {
    match command {
        Commands::List(args) => {
            select_view(app, &args.view)?;
            let view = app.render();
            if args.json {
                let json = serde_json::to_string_pretty(&view).map_err(crate::error::StoreError::from)?;
                writeln!(out, "{json}")?;
            } else {
                write!(out, "{}", format_view(&view))?;
            }
        }
        Commands::Add(args) => {
            let mut form = app
                .new_form()
                .ok_or_else(|| AppError::Usage("adding is not available in this view".into()))?;
            form.title = args.title;
            form.description = args.description.unwrap_or_default();
            if let Some(due) = args.due {
                form.due = due;
            }
            form.priority = args.priority;
            form.status = args.status;
            check_submitted(app.dispatch(Intent::Submit(form))?)?;
            let id = app
                .board()
                .tasks(args.status)
                .last()
                .map(|t| t.id.clone())
                .unwrap_or_default();
            writeln!(out, "{id}")?;
        }
        Commands::Edit(args) => {
            column_of(app, &args.id)?;
            select_view(app, &args.view)?;
            let Some(mut form) = app.edit_form(&args.id) else {
                return Ok(report_hidden(app, &args.id, out)?);
            };
            if let Some(title) = args.title {
                form.title = title;
            }
            if let Some(description) = args.description {
                form.description = description;
            }
            if let Some(due) = args.due {
                form.due = due;
            }
            if let Some(priority) = args.priority {
                form.priority = priority;
            }
            if let Some(status) = args.status {
                form.status = status;
            }
            if app.dispatch(Intent::Submit(form))? == Outcome::Ignored {
                report_hidden(app, &args.id, out)?;
            }
        }
        Commands::Start { id } => {
            let from = column_of(app, &id)?;
            if app.dispatch(Intent::Start(id.clone()))? == Outcome::Ignored {
                if app.is_visible(&id) {
                    writeln!(out, "{id} is in {from}, only to do tasks can be started")?;
                } else {
                    report_hidden(app, &id, out)?;
                }
            }
        }
        Commands::Done { id } => {
            column_of(app, &id)?;
            if app.dispatch(Intent::Complete(id.clone()))? == Outcome::Ignored {
                report_hidden(app, &id, out)?;
            }
        }
        Commands::Move { id, to } => {
            let from = column_of(app, &id)?;
            if app.dispatch(Intent::Move { id: id.clone(), from, to })? == Outcome::Ignored {
                if app.is_visible(&id) {
                    writeln!(out, "move {from} -> {to} is not allowed, {id} left in {from}")?;
                } else {
                    report_hidden(app, &id, out)?;
                }
            }
        }
        Commands::Delete { id, yes, view } => {
            column_of(app, &id)?;
            if !yes {
                return Err(AppError::Usage(format!("refusing to delete {id} without --yes")));
            }
            select_view(app, &view)?;
            if app.dispatch(Intent::Delete { id: id.clone(), confirmed: true })? == Outcome::Ignored {
                report_hidden(app, &id, out)?;
            }
        }
        Commands::Clear { yes } => {
            if !yes {
                return Err(AppError::Usage("refusing to clear the board without --yes".into()));
            }
            app.dispatch(Intent::ClearAll { confirmed: true })?;
        }
    }
    Ok(())
}

fn column_of(app: &App, id: &str) -> Result<Column, AppError> {
    app.board()
        .column_of(id)
        .ok_or_else(|| AppError::UnknownTask(id.to_string()))
}

fn select_view(app: &mut App, view: &ViewArgs) -> Result<(), AppError> {
    app.dispatch(Intent::SetMode(view.mode))?;
    if view.date.is_some() {
        app.dispatch(Intent::SelectDate(view.date))?;
    }
    Ok(())
}

/// Reports an action ignored because the current view does not show `id`.
fn report_hidden<W: Write>(app: &App, id: &str, out: &mut W) -> std::io::Result<()> {
    let due = app
        .board()
        .find_task(id)
        .and_then(|t| t.due())
        .unwrap_or(NO_DUE);
    writeln!(
        out,
        "{id} (due {due}) is not shown in the {} view, nothing changed",
        app.view().mode()
    )
}

fn check_submitted(outcome: Outcome) -> Result<(), AppError> {
    match outcome {
        Outcome::Rejected(e) => Err(e.into()),
        _ => Ok(()),
    }
}

/// Plain-text rendering of a [`BoardView`].
pub fn format_view(view: &BoardView) -> String {
    let mut out = String::new();
    match &view.body {
        Body::Placeholder { heading, message } => {
            out.push_str(&format!("{heading}\n  {message}\n"));
        }
        Body::Columns { date, columns } => {
            out.push_str(&format!("{} view, {date}\n", view.toolbar.active_mode));
            for column in columns {
                out.push_str(&format!("\n== {} ==\n", column.heading));
                if column.cards.is_empty() {
                    out.push_str(&format!("  {EMPTY_COLUMN}\n"));
                }
                for card in &column.cards {
                    out.push_str(&format_card(card));
                }
            }
        }
    }
    out
}

fn format_card(card: &CardView) -> String {
    let mut line = format!(
        "  [{}] {}  ({}, {})",
        card.id, card.title, card.due_label, card.priority
    );
    if let Some(badge) = card.badge {
        line.push_str(&format!("  {badge}"));
    }
    line.push('\n');
    if !card.description.is_empty() {
        line.push_str(&format!("      {}\n", card.description));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_move_command() {
        let cli = Cli::try_parse_from(["taskers", "move", "abc", "inprogress"]).unwrap();
        match cli.command {
            Some(Commands::Move { id, to }) => {
                assert_eq!(id, "abc");
                assert_eq!(to, Column::InProgress);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_list_with_date() {
        let cli = Cli::try_parse_from(["taskers", "list", "--mode", "past", "--date", "2024-01-01"]).unwrap();
        let Some(Commands::List(args)) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.view.mode, ViewMode::Past);
        assert_eq!(args.view.date, NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn delete_and_edit_take_a_view() {
        let cli = Cli::try_parse_from([
            "taskers", "delete", "abc", "--yes", "--mode", "future", "--date", "2024-03-03",
        ])
        .unwrap();
        let Some(Commands::Delete { id, yes, view }) = cli.command else {
            panic!("expected delete");
        };
        assert_eq!(id, "abc");
        assert!(yes);
        assert_eq!(view.mode, ViewMode::Future);
        assert_eq!(view.date, NaiveDate::from_ymd_opt(2024, 3, 3));

        let cli = Cli::try_parse_from(["taskers", "edit", "abc", "--title", "t"]).unwrap();
        let Some(Commands::Edit(args)) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(args.view.mode, ViewMode::Today);
        assert_eq!(args.view.date, None);
    }

    #[test]
    fn rejects_unknown_priority() {
        assert!(Cli::try_parse_from(["taskers", "add", "t", "--priority", "urgent"]).is_err());
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["taskers", "--board", "/tmp/b.json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.board, Some(PathBuf::from("/tmp/b.json")));
    }
}
