//! File access grant tooling.

use std::sync::Arc;

use clap::{Args, Subcommand};

use civicwatch_core::config::AppConfig;
use civicwatch_core::error::AppError;
use civicwatch_core::types::SystemClock;
use civicwatch_security::token::{PurposeKeyring, TokenIssuer, TokenVerifier};
use civicwatch_security::{FileAccessIssuer, TracingAuditSink};

use crate::output::{self, OutputFormat};

/// Arguments for grant commands
#[derive(Debug, Args)]
pub struct GrantArgs {
    /// Grant subcommand
    #[command(subcommand)]
    pub command: GrantCommand,
}

/// Grant subcommands
#[derive(Debug, Subcommand)]
pub enum GrantCommand {
    /// Issue a download grant for a resource path
    Issue {
        /// Opaque resource path the grant is for
        path: String,
        /// Account ID the grant is issued to
        #[arg(long)]
        actor: Option<i64>,
        /// Grant lifetime in seconds (defaults to the configured TTL)
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Verify a grant token and show what it grants
    Verify {
        /// The grant token
        token: String,
    },
}

/// Execute grant commands
pub async fn execute(
    args: &GrantArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let issuer = build_issuer(config);

    match &args.command {
        GrantCommand::Issue { path, actor, ttl } => {
            let grant = issuer.issue(path, *actor, *ttl).await?;
            match format {
                OutputFormat::Text => {
                    output::print_success(&format!("Grant issued for '{}'", path));
                    output::print_kv("token", &grant.token);
                    output::print_kv("session_id", &grant.session_id.to_string());
                    output::print_kv("expires_at", &grant.expires_at.to_rfc3339());
                }
                OutputFormat::Json => output::print_item(&grant, format),
            }
        }
        GrantCommand::Verify { token } => {
            let verified = issuer.verify(token).await?;
            match format {
                OutputFormat::Text => {
                    output::print_success("Grant token is valid");
                    output::print_kv("resource_path", &verified.resource_path);
                    output::print_kv(
                        "actor_id",
                        &verified
                            .actor_id
                            .map_or_else(|| "anonymous".to_string(), |id| id.to_string()),
                    );
                    output::print_kv("session_id", &verified.session_id.to_string());
                    output::print_kv("expires_at", &verified.expires_at.to_rfc3339());
                }
                OutputFormat::Json => output::print_item(&verified, format),
            }
        }
    }

    Ok(())
}

fn build_issuer(config: &AppConfig) -> FileAccessIssuer {
    let keyring = Arc::new(PurposeKeyring::from_config(&config.security));
    let clock = Arc::new(SystemClock);
    FileAccessIssuer::new(
        TokenIssuer::new(Arc::clone(&keyring), clock.clone() as _),
        TokenVerifier::new(keyring, clock as _),
        Arc::new(TracingAuditSink::new()),
        config.security.file_grant_ttl_seconds,
    )
}
