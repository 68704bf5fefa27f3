use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tb", about = concat!("[x] tickboard v", env!("CARGO_PKG_VERSION"), " - checklists that sync"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use this config file instead of searching for tickboard.toml
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a board to tickboard.toml and create its empty store file
    Init(InitArgs),
    /// List configured boards
    Boards,
    /// Show a board's tasks
    List(ListArgs),
    /// Add a task
    Add(AddArgs),
    /// Toggle one tick of a task
    Tick(TickArgs),
    /// Delete a task
    Rm(RmArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Board name
    #[arg(long)]
    pub board: String,
    /// Ticks per task
    #[arg(long, default_value_t = 1)]
    pub ticks: usize,
    /// Allow a category when adding tasks
    #[arg(long)]
    pub categories: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Board name (default: first configured board)
    pub board: Option<String>,
    /// Only show tasks whose name contains TEXT
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task name, or board name followed by task name
    #[arg(num_args = 1..=2, required = true, value_names = ["BOARD", "NAME"])]
    pub args: Vec<String>,
    /// Category (boards with categories enabled)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct TickArgs {
    /// Task id, or board name followed by task id
    #[arg(num_args = 1..=2, required = true, value_names = ["BOARD", "ID"])]
    pub args: Vec<String>,
    /// Which tick to toggle (0-based)
    #[arg(long, default_value_t = 0)]
    pub index: usize,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task id, or board name followed by task id
    #[arg(num_args = 1..=2, required = true, value_names = ["BOARD", "ID"])]
    pub args: Vec<String>,
}

/// Split `[BOARD] VALUE` positionals
pub fn board_and_value(args: &[String]) -> (Option<&str>, &str) {
    match args {
        [board, value] => (Some(board.as_str()), value.as_str()),
        [value] => (None, value.as_str()),
        _ => (None, ""),
    }
}
