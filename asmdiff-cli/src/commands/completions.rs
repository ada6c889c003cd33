//! Completions command - Print a shell completion script for asmdiff

use std::io::Write;

use clap::Command;
use clap_complete::{generate, Shell};

/// Name the scripts register completions for.
const BIN_NAME: &str = "asmdiff";

/// Shown under `asmdiff completions --help`.
pub const INSTALL_HELP: &str = "\
Install:
  bash        asmdiff completions bash > ~/.local/share/bash-completion/completions/asmdiff
  zsh         asmdiff completions zsh > ~/.zfunc/_asmdiff   (with fpath+=~/.zfunc)
  fish        asmdiff completions fish > ~/.config/fish/completions/asmdiff.fish
  powershell  asmdiff completions powershell >> $PROFILE
  elvish      asmdiff completions elvish >> ~/.config/elvish/rc.elv";

pub fn write_script(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    generate(shell, cmd, BIN_NAME, out);
}

/// Run the completions command
pub fn run(shell: Shell, cmd: &mut Command) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_script(shell, cmd, &mut stdout);
    stdout.flush()?;
    Ok(())
}
