mod autolink;
mod commands;
mod config;
mod diagnostics;
mod error;
mod pattern;
mod registry;
mod revision;
mod rewrite;
mod roles;
mod scanner;
mod types;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::Overrides;

/// Default output directory for `render` and `watch`.
const DEFAULT_OUT_DIR: &str = "_build/revlink";

#[derive(Parser)]
#[command(name = "revlink", about = "Revision-pinned source links for documentation roles")]
struct Cli {
    /// Source-hosting base URL, overriding `base_url` in .revlink.toml
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
    /// Leave occurrences of this role as written (repeatable)
    #[arg(long = "disable", global = true, value_name = "ROLE")]
    disabled: Vec<String>,
    /// Pin links to this revision instead of asking git
    #[arg(long, global = true)]
    revision: Option<String>,
    /// Log registrations and scanned files
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List role occurrences in the docs and where they link to
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Exit 1 if any occurrence uses an unknown role
        #[arg(long)]
        strict: bool,
    },
    /// Rewrite docs with role occurrences replaced by links
    Render {
        /// Output directory
        #[arg(long, default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,
    },
    /// Render one role occurrence: `revlink resolve component "HAL <8bkc-hal>"`
    Resolve {
        /// Output the reference node as JSON
        #[arg(long)]
        json: bool,
        /// Role name
        role: String,
        /// Role text, `label <target>` or a bare target
        text: String,
    },
    /// Print the revision links are pinned to
    Revision,
    /// Manage the roles in .revlink.toml
    Roles {
        #[command(subcommand)]
        action: RoleAction,
    },
    /// Render, then re-render whenever docs, config, or HEAD change
    Watch {
        /// Output directory
        #[arg(long, default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum RoleAction {
    /// Add a role: `revlink roles add tool tools/%s`
    Add {
        /// Role name
        name: String,
        /// Path below `tree/<revision>/`, with one `%s` for the target
        path: String,
    },
    /// List configured roles
    List,
    /// Remove a role
    Remove {
        /// Role name
        name: String,
    },
}

/// Install the stderr log subscriber. `REVLINK_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("REVLINK_LOG").unwrap_or_else(|_| return EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = Overrides {
        base_url: cli.base_url,
        disabled: cli.disabled,
        revision: cli.revision,
    };

    let result = match cli.command {
        Commands::Check { json, strict } => commands::check(&overrides, json, strict),
        Commands::Render { out_dir } => {
            commands::render(&PathBuf::from("."), &overrides, &out_dir).map(|_| return ExitCode::SUCCESS)
        },
        Commands::Resolve { json, role, text } => {
            commands::resolve(&overrides, &role, &text, json).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Revision => commands::revision(&overrides).map(|()| return ExitCode::SUCCESS),
        Commands::Roles { action } => run_role_action(action).map(|()| return ExitCode::SUCCESS),
        Commands::Watch { out_dir } => watch::run(&overrides, &out_dir),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    }
}

/// Dispatch a `roles` subcommand.
///
/// # Errors
///
/// Returns errors from config reading or writing.
fn run_role_action(action: RoleAction) -> Result<(), error::Error> {
    return match action {
        RoleAction::Add { name, path } => roles::cmd_add(&name, &path),
        RoleAction::List => roles::cmd_list(),
        RoleAction::Remove { name } => roles::cmd_remove(&name),
    };
}
