mod checks;
mod commands;
mod config;
mod diagnostics;
mod error;
mod extract;
mod info;
mod report;
mod resolver;
mod site;
mod types;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::checks::CheckKind;
use crate::report::Format;

/// Exit code for setup and runtime errors.
const EXIT_RUNTIME_ERROR: u8 = 2;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "SITECHECK_LOG";

#[derive(Parser)]
#[command(name = "sitecheck", about = "Validate static site build output", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Build output root (defaults to `root` in .sitecheck.toml, else `public`)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run checks against the build output (exit 0 pass, 1 fail, 2 error)
    Check {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Run only these checks (repeatable)
        #[arg(long, value_enum)]
        only: Vec<CheckKind>,
    },
    /// Output a comprehensive reference document
    Info {
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Show how a page's references resolve, or the candidates tried for one target
    Resolve {
        /// Document path relative to the build output root (e.g., blog/index.html)
        document: String,
        /// A single href/src value to resolve as if it appeared in the document
        target: Option<String>,
    },
    /// Run checks, then re-run whenever the build output changes
    Watch {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Run only these checks (repeatable)
        #[arg(long, value_enum)]
        only: Vec<CheckKind>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let root = cli.root.as_deref();

    let result = match cli.command {
        Commands::Check { format, only } => commands::check(root, format, &only),
        Commands::Info { json } => {
            commands::info(json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Resolve { document, target } => {
            commands::resolve(root, &document, target.as_deref()).map(|()| ExitCode::SUCCESS)
        },
        Commands::Watch { format, only } => watch::run(root, format, &only),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        },
    }
}

/// Install a stderr subscriber. `SITECHECK_LOG` wins; otherwise `-v` selects
/// debug output for this crate and the default is warnings only.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "sitecheck=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
