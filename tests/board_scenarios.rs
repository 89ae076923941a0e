use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

use taskers::app::{App, Intent, Outcome};
use taskers::cli::{run_command, Cli, Commands};
use taskers::kanban_board::KanbanBoard;
use taskers::store::BoardStore;
use taskers::task::Column;
use taskers::view::ViewMode;

use clap::Parser;

fn jan_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn board_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("board.json")
}

fn open(dir: &TempDir, today: NaiveDate) -> App {
    App::with_clock(BoardStore::new(board_path(dir)), move || today)
}

fn cli(app: &mut App, args: &[&str]) -> String {
    let mut argv = vec!["taskers"];
    argv.extend_from_slice(args);
    let command: Commands = Cli::try_parse_from(argv).unwrap().command.unwrap();
    let mut out = Vec::new();
    run_command(command, app, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// Asserts that no id is held by more than one column.
fn assert_single_ownership(board: &KanbanBoard) {
    let mut ids: Vec<&str> = Column::ALL
        .iter()
        .flat_map(|c| board.tasks(*c).iter().map(|t| t.id.as_str()))
        .collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn new_task_only_visible_on_its_due_date() {
    let dir = TempDir::new().unwrap();
    let mut app = open(&dir, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
    let id = cli(&mut app, &["add", "Write report", "--due", "2024-01-01", "--status", "todo"]);
    let id = id.trim().to_string();
    assert_eq!(app.board().column_of(&id), Some(Column::Todo));

    // not due today
    let today = app.render();
    assert!(today.columns().iter().all(|c| c.cards.is_empty()));

    app.dispatch(Intent::SetMode(ViewMode::Future)).unwrap();
    app.dispatch(Intent::SelectDate(Some(jan_first()))).unwrap();
    let view = app.render();
    assert_eq!(view.column(Column::Todo).unwrap().cards[0].id, id);

    app.dispatch(Intent::SelectDate(NaiveDate::from_ymd_opt(2024, 1, 2))).unwrap();
    assert!(app.render().column(Column::Todo).unwrap().cards.is_empty());
}

#[test]
fn mark_done_moves_without_changing_size() {
    let dir = TempDir::new().unwrap();
    let mut app = open(&dir, jan_first());
    let x = cli(&mut app, &["add", "X"]).trim().to_string();
    cli(&mut app, &["add", "Y", "--status", "inprogress"]);
    let size = app.board().len();

    cli(&mut app, &["done", x.as_str()]);
    assert!(app.board().tasks(Column::Todo).is_empty());
    assert_eq!(app.board().tasks(Column::Done).last().unwrap().id, x);
    assert_eq!(app.board().len(), size);
    assert_single_ownership(app.board());
}

#[test]
fn illegal_move_leaves_board_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut app = open(&dir, jan_first());
    let id = cli(&mut app, &["add", "shipped", "--status", "done"]).trim().to_string();
    let before = app.board().clone();

    let out = cli(&mut app, &["move", id.as_str(), "todo"]);
    assert!(out.contains("not allowed"));
    assert_eq!(app.board(), &before);

    let outcome = app
        .dispatch(Intent::Move {
            id: id.clone(),
            from: Column::Done,
            to: Column::Done,
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Ignored);
    assert_eq!(app.board(), &before);
}

#[test]
fn legal_moves_follow_the_graph() {
    let dir = TempDir::new().unwrap();
    let mut app = open(&dir, jan_first());
    let id = cli(&mut app, &["add", "flow"]).trim().to_string();
    cli(&mut app, &["move", id.as_str(), "inprogress"]);
    assert_eq!(app.board().column_of(&id), Some(Column::InProgress));
    cli(&mut app, &["move", id.as_str(), "todo"]);
    assert_eq!(app.board().column_of(&id), Some(Column::InProgress));
    cli(&mut app, &["move", id.as_str(), "done"]);
    assert_eq!(app.board().column_of(&id), Some(Column::Done));
}

#[test]
fn edit_can_reclassify_to_any_column() {
    let dir = TempDir::new().unwrap();
    let mut app = open(&dir, jan_first());
    let id = cli(&mut app, &["add", "reopen me", "--status", "done"]).trim().to_string();
    cli(&mut app, &["edit", id.as_str(), "--status", "todo", "--title", "reopened"]);
    assert_eq!(app.board().column_of(&id), Some(Column::Todo));
    assert_eq!(app.board().find_task(&id).unwrap().title, "reopened");
    assert_single_ownership(app.board());
}

#[test]
fn clear_all_is_persisted_immediately() {
    let dir = TempDir::new().unwrap();
    let mut app = open(&dir, jan_first());
    cli(&mut app, &["add", "a"]);
    cli(&mut app, &["add", "b", "--status", "inprogress"]);
    cli(&mut app, &["add", "c", "--status", "done"]);
    cli(&mut app, &["clear", "--yes"]);

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(board_path(&dir)).unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!({"columns": {"todo": [], "inprogress": [], "done": []}})
    );
}

#[test]
fn save_then_load_preserves_membership() {
    let dir = TempDir::new().unwrap();
    let mut app = open(&dir, jan_first());
    let a = cli(&mut app, &["add", "a"]).trim().to_string();
    let b = cli(&mut app, &["add", "b", "--due", ""]).trim().to_string();
    cli(&mut app, &["start", a.as_str()]);

    let reopened = open(&dir, jan_first());
    assert_eq!(reopened.board(), app.board());
    assert_eq!(reopened.board().column_of(&a), Some(Column::InProgress));
    assert_eq!(reopened.board().find_task(&b).unwrap().due(), None);
}

#[test]
fn corrupted_board_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(board_path(&dir), "{\"columns\": {\"todo\": \"oops\"").unwrap();
    let app = open(&dir, jan_first());
    assert!(app.board().is_empty());
    for column in Column::ALL {
        assert!(app.board().tasks(column).is_empty());
    }
}

#[test]
fn past_listing_shows_badges() {
    let dir = TempDir::new().unwrap();
    let mut app = open(&dir, jan_first());
    let id = cli(&mut app, &["add", "old news"]).trim().to_string();
    cli(&mut app, &["done", id.as_str()]);

    let mut later = open(&dir, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    let out = cli(&mut later, &["list", "--mode", "past", "--date", "2024-01-01"]);
    assert!(out.contains("== Done (1) =="));
    assert!(out.contains("old news"));
    assert!(out.contains("Completed"));

    let out = cli(&mut later, &["list", "--mode", "past"]);
    assert!(out.contains("Past — select a date"));
}

#[test]
fn actions_on_tasks_outside_the_view_are_reported() {
    let dir = TempDir::new().unwrap();
    let mut app = open(&dir, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
    let old = cli(&mut app, &["add", "overdue", "--due", "2024-01-01"]).trim().to_string();
    let busy = cli(&mut app, &["add", "busy", "--status", "inprogress"]).trim().to_string();
    let before = app.board().clone();

    for args in [
        vec!["done", old.as_str()],
        vec!["start", old.as_str()],
        vec!["move", old.as_str(), "inprogress"],
        vec!["delete", old.as_str(), "--yes"],
        vec!["edit", old.as_str(), "--title", "renamed"],
    ] {
        let out = cli(&mut app, &args);
        assert!(out.contains("(due 2024-01-01) is not shown in the today view"), "{args:?}: {out}");
    }

    // the future view only shows to do cards
    let out = cli(
        &mut app,
        &["delete", busy.as_str(), "--yes", "--mode", "future", "--date", "2024-03-03"],
    );
    assert!(out.contains("is not shown in the future view"));
    assert_eq!(app.board(), &before);

    // acting through the view that shows the task works
    let out = cli(
        &mut app,
        &["delete", old.as_str(), "--yes", "--mode", "future", "--date", "2024-01-01"],
    );
    assert_eq!(out, "");
    assert!(!app.board().contains(&old));
}
