//! Command-line interface for eigenprint.

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::PrinterConfig;
use crate::dispatch::{self, DispatchTable};
use crate::host::{LookupChain, Snapshot, SnapshotValue};
use crate::render;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Render Eigen matrices, arrays, refs and quaternions from a debugger
/// snapshot.
///
/// A snapshot is a YAML image of the types, memory and variables of a paused
/// process. Values whose type is recognized are shown element by element;
/// anything else falls back to a plain rendering.
#[derive(Parser)]
#[command(name = "eigenprint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Format the variables of a snapshot
    #[command(visible_alias = "show")]
    Print(PrintArgs),
    /// List the registered type patterns in match order
    Patterns(PatternsArgs),
}

/// Arguments for the print command.
#[derive(Parser)]
pub struct PrintArgs {
    /// Snapshot YAML file
    pub snapshot: PathBuf,

    /// Variable to print (repeatable; default: all)
    #[arg(long = "var", value_name = "NAME")]
    pub vars: Vec<String>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root namespace of the matrix library
    #[arg(long)]
    pub namespace: Option<String>,

    /// Children shown per value (0 = all)
    #[arg(long)]
    pub max_children: Option<usize>,
}

/// Arguments for the patterns command.
#[derive(Parser)]
pub struct PatternsArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root namespace of the matrix library
    #[arg(long)]
    pub namespace: Option<String>,
}

/// Install the logger. `RUST_LOG` takes precedence over `-v`.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Load the config and apply command-line overrides.
fn resolve_config(
    explicit: Option<&Path>,
    namespace: Option<&str>,
    max_children: Option<usize>,
) -> anyhow::Result<PrinterConfig> {
    let mut config = PrinterConfig::load(explicit, Path::new("."))?;
    if let Some(ns) = namespace {
        config.namespace = ns.to_string();
    }
    if let Some(n) = max_children {
        config.max_children = n;
    }
    config.validate()?;
    Ok(config)
}

/// Run the print command.
pub fn run_print(args: &PrintArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let config = resolve_config(
        args.config.as_deref(),
        args.namespace.as_deref(),
        args.max_children,
    )?;
    let table = dispatch::init(&config)?;

    let snapshot = match Snapshot::parse_file(&args.snapshot) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error parsing snapshot {}: {}", args.snapshot.display(), e);
            return Ok(EXIT_ERROR);
        }
    };

    // Select variables
    let names = if args.vars.is_empty() {
        snapshot.variable_names()
    } else {
        args.vars.clone()
    };
    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        match snapshot.variable(&name) {
            Some(value) => selected.push((name, value)),
            None => {
                eprintln!("Error: no variable named {:?} in snapshot", name);
                return Ok(EXIT_ERROR);
            }
        }
    }

    let mut chain: LookupChain<SnapshotValue> = LookupChain::new();
    dispatch::register_printers(&mut chain);

    let rendered: Vec<_> = selected
        .iter()
        .map(|(name, value)| render::render_value(name, value, &chain, config.child_limit()))
        .collect();
    log::debug!("rendered {} values", rendered.len());

    let snapshot_str = args.snapshot.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => render::write_json(&snapshot_str, table.namespace(), &rendered)?,
        _ => render::write_pretty(&snapshot_str, &rendered),
    }

    if rendered.iter().any(|v| v.failed()) {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the patterns command.
pub fn run_patterns(args: &PatternsArgs) -> anyhow::Result<i32> {
    let config = resolve_config(args.config.as_deref(), args.namespace.as_deref(), None)?;
    let table = DispatchTable::from_config(&config)?;

    println!("Registered patterns (namespace {}):", table.namespace());
    println!();
    for (i, entry) in table.entries().iter().enumerate() {
        println!("  {}. {:<32} {}", i + 1, entry.pattern(), entry.kind());
    }

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_print_args() {
        let cli = Cli::parse_from([
            "eigenprint",
            "-vv",
            "print",
            "snap.yaml",
            "--var",
            "m",
            "--var",
            "q",
            "--format",
            "json",
            "--max-children",
            "0",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Print(args) => {
                assert_eq!(args.snapshot, PathBuf::from("snap.yaml"));
                assert_eq!(args.vars, vec!["m", "q"]);
                assert_eq!(args.format, "json");
                assert_eq!(args.max_children, Some(0));
                assert!(args.namespace.is_none());
            }
            Commands::Patterns(_) => panic!("expected print"),
        }
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let config = resolve_config(None, Some("myeigen"), Some(5)).unwrap();
        assert_eq!(config.namespace, "myeigen");
        assert_eq!(config.child_limit(), Some(5));
        assert!(resolve_config(None, Some("not a namespace"), None).is_err());
    }

    #[test]
    fn test_invalid_format_is_an_error_exit() {
        let args = PrintArgs {
            snapshot: PathBuf::from("missing.yaml"),
            vars: Vec::new(),
            format: "xml".to_string(),
            config: None,
            namespace: None,
            max_children: None,
        };
        assert_eq!(run_print(&args).unwrap(), EXIT_ERROR);
    }
}
