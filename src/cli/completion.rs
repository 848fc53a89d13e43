// src/cli/completion.rs
use crate::cli::args::Cli;
use clap::CommandFactory;
use clap_complete::{
    generate,
    shells::{Bash, Fish, Zsh},
};
use std::io::{self, Write};
use tracing::{debug, instrument};

/// Writes the completion script for `shell` ("bash", "zsh" or "fish") to `out`.
///
/// ```bash
/// eval "$(markport completion bash)"
/// ```
#[instrument(level = "debug", skip(out))]
pub fn write_completion<W: Write>(shell: &str, out: &mut W) -> io::Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    match shell.to_lowercase().as_str() {
        "bash" => {
            debug!("Generating bash completion");
            generate(Bash, &mut cmd, bin_name, out);
            Ok(())
        }
        "zsh" => {
            debug!("Generating zsh completion");
            generate(Zsh, &mut cmd, bin_name, out);
            Ok(())
        }
        "fish" => {
            debug!("Generating fish completion");
            generate(Fish, &mut cmd, bin_name, out);
            Ok(())
        }
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Unsupported shell: {}. Supported shells: bash, zsh, fish",
                shell
            ),
        )),
    }
}

pub fn generate_completion(shell: &str) -> io::Result<()> {
    write_completion(shell, &mut io::stdout())
}
