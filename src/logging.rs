use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Log file written by the TUI, inside the store directory
pub const LOG_FILE: &str = ".tickboard.log";

/// Default filter directive for a `-v` count. `RUST_LOG` wins when set.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// CLI commands log to stderr. The TUI owns the terminal, so it passes a
/// log file instead; if that file cannot be opened, logging is dropped.
pub fn init_tracing(verbose: u8, log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level_for(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = match log_file {
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .try_init(),
        Some(path) => {
            let file = match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => file,
                Err(_) => return,
            };
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    if let Err(err) = result {
        tracing::debug!(error = %err, "tracing subscriber already set, continuing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "trace");
    }
}
