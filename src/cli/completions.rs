//! Shell completion scripts for `dotinject`.

use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};

use crate::cli::{Cli, Shell};
use crate::error::Result;

/// Write the completion script for `shell` to stdout, covering every
/// subcommand plus the `--format` and `--store` values.
pub fn execute(shell: Shell) -> Result<i32> {
    let target = match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
    };

    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(target, &mut cmd, bin, &mut std::io::stdout());
    Ok(0)
}
