// src/cli/mod.rs
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::config::Settings;
use termcolor::StandardStream;

pub mod args;
pub mod completion;
pub mod display;
pub mod error;
pub mod import_commands;

pub fn execute_command(stderr: StandardStream, cli: Cli, settings: Settings) -> CliResult<()> {
    if cli.generate_config {
        println!("{}", crate::config::generate_default_config());
        return Ok(());
    }
    match cli.command {
        Some(Commands::Import { .. }) => import_commands::import(stderr, cli, settings),
        Some(Commands::Check { .. }) => import_commands::check(stderr, cli, settings),
        Some(Commands::Completion { shell }) => handle_completion(shell),
        None => Ok(()),
    }
}

fn handle_completion(shell: String) -> CliResult<()> {
    match shell.to_lowercase().as_str() {
        "bash" => {
            eprintln!("# Outputting bash completion script for markport");
            eprintln!("# To use, run one of:");
            eprintln!("# - eval \"$(markport completion bash)\"        # one-time use");
            eprintln!("# - markport completion bash >> ~/.bashrc       # add to bashrc");
            eprintln!("#");
        }
        "zsh" => {
            eprintln!("# Outputting zsh completion script for markport");
            eprintln!("# To use, run one of:");
            eprintln!("# - eval \"$(markport completion zsh)\"         # one-time use");
            eprintln!("# - markport completion zsh > ~/.zfunc/_markport # save to fpath directory");
            eprintln!("#");
        }
        "fish" => {
            eprintln!("# Outputting fish completion script for markport");
            eprintln!("# - markport completion fish > ~/.config/fish/completions/markport.fish");
            eprintln!("#");
        }
        _ => {}
    }

    completion::generate_completion(&shell).map_err(|e| {
        CliError::CommandFailed(format!("Failed to generate completion script: {}", e))
    })
}
