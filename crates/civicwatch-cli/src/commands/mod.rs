//! CLI command definitions and dispatch.

pub mod field;
pub mod grant;
pub mod keygen;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use civicwatch_core::config::AppConfig;
use civicwatch_core::error::AppError;

/// CivicWatch — security administration tooling
#[derive(Debug, Parser)]
#[command(name = "civicwatch", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment to load (reads config/<env>.toml)
    #[arg(short, long, default_value = "default")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a field encryption key
    Keygen,
    /// Encrypt or decrypt individual field values
    Field(field::FieldArgs),
    /// Issue or inspect file access grants
    Grant(grant::GrantArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Keygen => keygen::execute(self.format),
            Commands::Field(args) => field::execute(args, config),
            Commands::Grant(args) => grant::execute(args, config, self.format).await,
        }
    }
}
