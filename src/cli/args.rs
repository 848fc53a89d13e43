// src/cli/args.rs
use crate::domain::parser::ParseMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Bulk import CSV article lists into a bookmarking service
pub struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    #[arg(long = "no-color", help = "disable colored output")]
    pub no_color: bool,

    #[arg(long = "generate-config", help = "print the default configuration and exit")]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import all articles of a CSV file
    Import {
        /// pathname to the CSV file
        path: PathBuf,

        #[arg(short = 'u', long = "username", env = "MARKPORT_USERNAME", help = "account name")]
        username: String,

        #[arg(
        short = 'p',
        long = "password",
        env = "MARKPORT_PASSWORD",
        hide_env_values = true,
        help = "account password"
        )]
        password: Option<String>,

        #[arg(short = 'm', long = "mode", help = "CSV parsing: positional | lenient")]
        mode: Option<ParseMode>,

        #[arg(long = "require-title", help = "reject rows without a title")]
        require_title: bool,

        #[arg(long = "proxy-url", help = "base URL of the bookmarking proxy")]
        proxy_url: Option<String>,

        #[arg(long = "batch-size", help = "rows per batch")]
        batch_size: Option<usize>,

        #[arg(long = "max-retries", help = "retries for rate limited or failing requests")]
        max_retries: Option<u32>,

        #[arg(long = "json", help = "print the import result as json")]
        is_json: bool,

        #[arg(
        long = "failed-report",
        value_name = "FILE",
        help = "write failed articles as json to FILE"
        )]
        failed_report: Option<PathBuf>,
    },
    /// Parse and validate a CSV file without importing
    Check {
        /// pathname to the CSV file
        path: PathBuf,

        #[arg(short = 'm', long = "mode", help = "CSV parsing: positional | lenient")]
        mode: Option<ParseMode>,

        #[arg(long = "require-title", help = "reject rows without a title")]
        require_title: bool,

        #[arg(long = "json", help = "output parsed rows as json")]
        is_json: bool,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for (bash, zsh, fish)
        shell: String,
    },
}
