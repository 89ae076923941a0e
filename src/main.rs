use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use taskers::app::App;
use taskers::cli::{self, Cli};
use taskers::config::{self, Config};
use taskers::error::AppError;
use taskers::store::BoardStore;
use taskers::ui::{self, Ui};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args = Cli::parse();
    let config_path = args.config.clone().unwrap_or_else(config::default_config_file);
    let config = Config::load(&config_path)?;
    let _guard = taskers::logging::init(&config.log);

    let board_file = args.board.clone().unwrap_or_else(|| config.board_file());
    tracing::info!(board = %board_file.display(), "starting");
    let mut app = App::load(BoardStore::new(board_file));

    match args.command {
        Some(command) => {
            let mut stdout = io::stdout().lock();
            cli::run_command(command, &mut app, &mut stdout)
        }
        None => run_tui(&mut app, &config),
    }
}

fn run_tui(app: &mut App, config: &Config) -> Result<(), AppError> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = Ui::new(config.ui.show_descriptions);
    let result = ui::run_app(&mut terminal, app, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "terminal loop failed");
    }
    result.map_err(AppError::from)
}
