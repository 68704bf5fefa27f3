use clap::Parser;
use tickboard::cli::commands::Cli;
use tickboard::cli::handlers;
use tickboard::logging;

fn main() {
    let cli = Cli::parse();

    if cli.command.is_none() {
        // No subcommand → launch TUI (it sets up file logging itself)
        if let Err(e) = tickboard::tui::run(cli.config.as_deref(), cli.verbose) {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    logging::init_tracing(cli.verbose, None);
    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
