use anyhow::{Context, Result};
use porto_core::config::{discover_root, Project, ROOT_ENV};

use crate::args::{Cli, Command, HookCommand};
use crate::git::ProcessGit;
use crate::output;

pub mod hook;
pub mod metadata;
pub mod validate;

/// Run the selected command and return its exit code.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    let env_root = std::env::var(ROOT_ENV).ok();
    let root = discover_root(cli.root.as_deref(), env_root.as_deref(), &cwd)?;
    tracing::debug!(root = %root.display(), "project root resolved");

    let project = Project::open(&root)
        .with_context(|| format!("opening porto project at {}", root.display()))?;

    let outcome = match cli.command {
        Command::Validate { kind, analyze } => validate::run(&project, kind, analyze)?,
        Command::Metadata => metadata::run(&project),
        Command::Hook {
            hook: HookCommand::PreCommit,
        } => hook::pre_commit(&project, &ProcessGit::new(&project.config.root)),
    };

    output::emit(&outcome)?;
    Ok(outcome.exit_code)
}
