use std::path::PathBuf;

use crate::cli::commands::InitArgs;
use crate::io::config_io::{self, CONFIG_FILE};
use crate::io::snapshot_io::{self, SnapshotError};
use crate::model::board::BoardKey;

const CONFIG_TEMPLATE: &str = r##"# tickboard configuration

[store]
# Board files live here, relative to this file
dir = "boards"

[sync]
# How long a local edit waits for the store to echo it back
confirm_timeout_ms = 5000
# Delay before typed filter text is applied
filter_debounce_ms = 250

# --- UI Customization ---
# Uncomment and edit to override defaults.
#
# [ui.colors]
# background = "#0C001B"
# text = "#A09BFE"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#5A5580"
# red = "#FF4444"
# yellow = "#FFD700"
# green = "#44FF88"
# cyan = "#44DDFF"

# --- Boards ---
# Add boards with [[boards]] entries, or use: tb init --board "Name"
"##;

/// Where `init` writes: the explicit `--config`, an existing config found
/// from the working directory, or a new one in the working directory.
fn init_config_path(config: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = config {
        return Ok(PathBuf::from(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(config_io::discover_config(&cwd).unwrap_or_else(|_| cwd.join(CONFIG_FILE)))
}

pub fn cmd_init(args: InitArgs, config: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let name = args.board.trim();
    if name.is_empty() {
        return Err("board name cannot be empty".into());
    }
    if args.ticks == 0 {
        return Err("--ticks must be at least 1".into());
    }

    let path = init_config_path(config)?;
    let created = !path.exists();
    let mut doc = if created {
        CONFIG_TEMPLATE.parse::<toml_edit::DocumentMut>()?
    } else {
        config_io::read_config_doc(&path)?
    };

    if config_io::has_board(&doc, name) {
        return Err(format!(
            "a board with key \"{}\" is already configured",
            BoardKey::from_name(name)
        )
        .into());
    }

    config_io::add_board_to_config(&mut doc, name, args.ticks, args.categories);
    config_io::write_config_doc(&path, &doc)?;
    tracing::info!(config = %path.display(), board = name, "board added to config");

    let loaded = config_io::load_config(&path)?;
    let key = BoardKey::from_name(name);
    match snapshot_io::create_board_file(&loaded.store_dir, &key) {
        Ok(file) => println!("created {}", file.display()),
        Err(SnapshotError::AlreadyExists(file)) => {
            println!("keeping existing {}", file.display());
        }
        Err(e) => return Err(e.into()),
    }
    if created {
        println!("created {}", path.display());
    }
    Ok(())
}
