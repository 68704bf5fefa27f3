mod init;
pub use init::cmd_init;

use std::path::Path;
use std::time::Instant;

use crate::board::{Board, BoardError, BoardSettings};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, LoadedConfig};
use crate::io::publisher::FilePublisher;
use crate::io::snapshot_io::{board_path, board_snapshot};
use crate::io::state::MemoryUiStore;
use crate::model::board::BoardKey;
use crate::ops::task_ops::find_task;
use crate::ops::view::derive_view;

/// Error type for CLI-only failures
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no boards configured (try `tb init --board NAME`)")]
    NoBoards,
    #[error("no board named \"{0}\" in the config")]
    NoSuchBoard(String),
    #[error("no task with id \"{0}\"")]
    NoSuchTask(String),
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let config = cli.config.as_deref();

    match cli.command {
        // No subcommand is handled in main.rs (TUI)
        None => Ok(()),
        Some(cmd) => match cmd {
            Commands::Init(args) => cmd_init(args, config),
            Commands::Boards => cmd_boards(config, json),
            Commands::List(args) => cmd_list(args, config, json),
            Commands::Add(args) => cmd_add(args, config, json),
            Commands::Tick(args) => cmd_tick(args, config, json),
            Commands::Rm(args) => cmd_rm(args, config),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Find and load tickboard.toml, from `--config` or by walking up from cwd
pub fn load_config_cwd(config: Option<&str>) -> Result<LoadedConfig, Box<dyn std::error::Error>> {
    Ok(config_io::resolve_config(config.map(Path::new))?)
}

/// Index of the named board, or the first board when no name is given
fn board_index(loaded: &LoadedConfig, name: Option<&str>) -> Result<usize, CliError> {
    if loaded.config.boards.is_empty() {
        return Err(CliError::NoBoards);
    }
    let Some(name) = name else {
        return Ok(0);
    };
    let wanted = BoardKey::from_name(name);
    loaded
        .config
        .boards
        .iter()
        .position(|b| {
            b.name
                .as_deref()
                .is_some_and(|n| BoardKey::from_name(n) == wanted)
        })
        .ok_or_else(|| CliError::NoSuchBoard(name.to_string()))
}

/// Build a board and feed it the current store contents.
///
/// CLI commands never touch persisted UI state, so the board gets an
/// in-memory store.
fn open_board(
    loaded: &LoadedConfig,
    index: usize,
) -> Result<Board, Box<dyn std::error::Error>> {
    let settings = BoardSettings::from_config(&loaded.config.boards[index], index)?;
    let key = BoardKey::from_name(&settings.name);
    let publisher =
        FilePublisher::spawn(loaded.store_dir.clone(), board_path(&loaded.store_dir, &key))?;
    let snapshot = board_snapshot(&loaded.store_dir, &key, settings.inline.as_deref());

    let mut board = Board::with_settings(
        settings,
        &loaded.config.sync,
        Box::new(MemoryUiStore::new()),
        Box::new(publisher),
    );
    board.receive(snapshot, Instant::now());
    Ok(board)
}

fn open_named_board(
    config: Option<&str>,
    name: Option<&str>,
) -> Result<Board, Box<dyn std::error::Error>> {
    let loaded = load_config_cwd(config)?;
    let index = board_index(&loaded, name)?;
    open_board(&loaded, index)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_boards(config: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_config_cwd(config)?;
    let mut infos = Vec::new();
    for index in 0..loaded.config.boards.len() {
        match open_board(&loaded, index) {
            Ok(mut board) => infos.push(board_info(&mut board)),
            Err(e) => {
                let label = loaded.config.boards[index].label(index);
                tracing::error!(board = %label, error = %e, "board could not be opened");
                eprintln!("{}: {}", label, e);
            }
        }
    }

    if json {
        print_json(&infos)?;
    } else {
        for info in &infos {
            println!("{}", format_board_info(info));
        }
    }
    Ok(())
}

fn cmd_list(
    args: ListArgs,
    config: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let board = open_named_board(config, args.board.as_deref())?;
    if !board.is_available() {
        return Err(BoardError::Unavailable(board.key().clone()).into());
    }

    let filter = args.filter.as_deref().unwrap_or("");
    let view = derive_view(board.tasks(), filter, board.settings().view_options());
    if json {
        print_json(&view_to_json(
            &board.settings().name,
            board.key().as_str(),
            filter,
            &view,
        ))?;
    } else {
        println!("{}", format_view(&board.settings().title, &view));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, config: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (board_name, name) = board_and_value(&args.args);
    let mut board = open_named_board(config, board_name)?;
    if args.category.is_some() && !board.settings().categories {
        eprintln!(
            "note: board \"{}\" has categories disabled, ignoring --category",
            board.settings().name
        );
    }

    let id = board.add_task(name, args.category.as_deref(), Instant::now())?;
    let task = find_task(board.tasks(), &id).cloned();
    // Nothing is reported until the write has landed
    board.finish()?;

    match task {
        Some(task) if json => print_json(&task_to_json(&task))?,
        _ => println!("{}", id),
    }
    Ok(())
}

fn cmd_tick(args: TickArgs, config: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (board_name, id) = board_and_value(&args.args);
    let mut board = open_named_board(config, board_name)?;
    if !board.toggle_tick(id, args.index, Instant::now())? {
        return Err(CliError::NoSuchTask(id.to_string()).into());
    }
    let task = find_task(board.tasks(), id).cloned();
    board.finish()?;

    if let Some(task) = task {
        if json {
            print_json(&task_to_json(&task))?;
        } else {
            println!("{} {}", format_ticks(&task.ticks), task.name);
        }
    }
    Ok(())
}

fn cmd_rm(args: RmArgs, config: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let (board_name, id) = board_and_value(&args.args);
    let mut board = open_named_board(config, board_name)?;
    if !board.delete_task(id, Instant::now())? {
        return Err(CliError::NoSuchTask(id.to_string()).into());
    }
    board.finish()?;
    println!("deleted {}", id);
    Ok(())
}
