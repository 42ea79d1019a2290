//! eigenprint CLI entry point.

use clap::Parser;
use eigenprint::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Print(args) => cli::run_print(&args),
        Commands::Patterns(args) => cli::run_patterns(&args),
    };
    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
