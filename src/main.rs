use bulk_rename::cli::{RenameCommand, SelectionArgs, run_cli_with_config};
use bulk_rename::output::OutputFormatter;
use bulk_rename::rules::RuleFields;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Batch-rename the files of a directory with composable rules
#[derive(Parser, Debug)]
#[command(name = "bulk-rename")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the proposed names without renaming anything
    Preview {
        #[command(flatten)]
        target: TargetArgs,

        /// Print the rename plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename the selected entries on disk
    Apply {
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Directory whose entries are renamed
    dir: PathBuf,

    /// Selection config file (defaults to .bulkrenamerc.toml, then ~/.config/bulk-rename/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(flatten)]
    selection: SelectionArgs,

    #[command(flatten)]
    rules: RuleFields,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let (command, target) = match cli.command {
        Command::Preview { target, json } => (RenameCommand::Preview { json }, target),
        Command::Apply { target } => (RenameCommand::Apply, target),
    };

    match run_cli_with_config(
        command,
        &target.dir,
        &target.rules,
        &target.selection,
        target.config.as_deref(),
    ) {
        Ok(report) if report.failures.is_empty() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
