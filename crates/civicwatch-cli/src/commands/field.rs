//! One-off field encryption operations.

use clap::{Args, Subcommand};

use civicwatch_core::config::AppConfig;
use civicwatch_core::error::AppError;
use civicwatch_security::FieldCipher;

use crate::output;

/// Arguments for field commands
#[derive(Debug, Args)]
pub struct FieldArgs {
    /// Field subcommand
    #[command(subcommand)]
    pub command: FieldCommand,
}

/// Field subcommands
#[derive(Debug, Subcommand)]
pub enum FieldCommand {
    /// Encrypt a value with the configured key
    Encrypt {
        /// The plaintext value
        value: String,
    },
    /// Decrypt a stored value with the configured key
    Decrypt {
        /// The stored value
        value: String,
        /// Fail instead of echoing the value back when decryption fails
        #[arg(long)]
        strict: bool,
    },
}

/// Execute field commands
pub fn execute(args: &FieldArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        FieldCommand::Encrypt { value } => {
            if config.security.field_key.is_none() {
                output::print_error(
                    "No [security].field_key configured; an ephemeral key would make \
                     this value undecryptable. Run `keygen` and set the key first.",
                );
                return Err(AppError::configuration(
                    "Refusing to encrypt with an ephemeral key",
                ));
            }
            let cipher = FieldCipher::from_config(&config.security)?;
            println!("{}", cipher.encrypt(value)?);
        }
        FieldCommand::Decrypt { value, strict } => {
            let mut security = config.security.clone();
            security.strict_decrypt = security.strict_decrypt || *strict;
            let cipher = FieldCipher::from_config(&security)?;
            println!("{}", cipher.decrypt(value)?);
        }
    }

    Ok(())
}
