//! Shell completion generation command.
//!
//! Prints completion scripts for bash, zsh, fish and PowerShell, with
//! installation hints on stderr.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

/// Name of the installed binary.
const BIN_NAME: &str = "graft";

/// Generate shell completion scripts
#[derive(Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    /// Execute the completions command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        if !global.quiet {
            print_instructions(self.shell);
        }

        generate(self.shell, &mut Cli::command(), BIN_NAME, &mut io::stdout());
        Ok(())
    }
}

fn print_instructions(shell: Shell) {
    eprintln!("# Generating {shell} completion script");
    match shell {
        Shell::Bash => {
            eprintln!("#   graft completions bash > ~/.local/share/bash-completion/completions/graft");
            eprintln!("# Or add to ~/.bashrc:");
            eprintln!("#   eval \"$(graft completions bash)\"");
        }
        Shell::Zsh => {
            eprintln!("#   graft completions zsh > ~/.zsh/completions/_graft");
            eprintln!("# Make sure ~/.zsh/completions is in your $fpath");
        }
        Shell::Fish => {
            eprintln!("#   graft completions fish > ~/.config/fish/completions/graft.fish");
        }
        Shell::PowerShell => {
            eprintln!("#   graft completions powershell | Out-String | Invoke-Expression");
        }
        _ => {}
    }
    eprintln!();
}
