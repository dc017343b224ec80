use anyhow::Result;
use clap::Parser;

mod args;
mod cmd;
mod git;
mod output;

fn main() -> Result<()> {
    let cli = args::Cli::parse();
    output::init(cli.json);
    output::init_tracing(cli.log_level.as_deref());

    let code = cmd::dispatch(cli)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
