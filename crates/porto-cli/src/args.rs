use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "porto",
    version,
    about = "Porto data validation and management CLI",
    after_help = "Examples:\n  porto validate                         Validate everything (default)\n  porto validate --type schema           Validate JSON schemas\n  porto validate --type links            Validate data links\n  porto validate --type links --analyze  Detailed links analysis\n  porto metadata                         Generate metadata.json\n  porto hook pre-commit                  Run the pre-commit checks"
)]
pub struct Cli {
    /// Project root (directory holding mappings.json). Defaults to $PORTO_ROOT,
    /// then the nearest parent directory with a mappings.json.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log filter (overrides $PORTO_LOG), e.g. `debug` or `porto_core=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate data files. Without --type, runs schema then links validation.
    Validate {
        /// Type of validation to run.
        #[arg(long = "type", value_enum)]
        kind: Option<ValidateKind>,

        /// Show detailed analysis (links validation only).
        #[arg(long)]
        analyze: bool,
    },

    /// Generate metadata.json (written only when content changed).
    Metadata,

    /// Git hook entry points.
    Hook {
        #[command(subcommand)]
        hook: HookCommand,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateKind {
    Schema,
    Links,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum HookCommand {
    /// Validate schemas and keep metadata.json staged alongside data changes.
    PreCommit,
}
