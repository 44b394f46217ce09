//! Completion command - print a shell completion script

use clap::CommandFactory;
use clap_complete::Shell;
use std::io;

use crate::Cli;
use crate::error::Result;

/// Write the completion script for `shell` to stdout
pub fn run(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
    Ok(())
}
