//! Completions command handler.

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

/// Generate a shell completion script on stdout.
pub fn handle<C: CommandFactory>(shell: Shell) -> Result<()> {
    let mut cmd = C::command();
    generate(shell, &mut cmd, "slackstat", &mut io::stdout());
    Ok(())
}
