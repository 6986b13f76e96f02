mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use solid_oidc_auth::{AuthError, ErrorCategory};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommands};
use output::{print_error, print_warning};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        let auth = auth_error(&e);
        if let Some(auth) = auth {
            tracing::debug!(category = %auth.category(), "Command failed");
            if auth.is_retryable() {
                print_warning("The provider could not be reached; retrying may succeed");
            }
        }
        std::process::exit(exit_code(auth));
    }
}

fn auth_error(err: &anyhow::Error) -> Option<&AuthError> {
    err.chain().find_map(|cause| cause.downcast_ref::<AuthError>())
}

/// Exit status by error category. Failures outside the library exit with 1.
fn exit_code(err: Option<&AuthError>) -> i32 {
    match err.map(AuthError::category) {
        None => 1,
        Some(ErrorCategory::Configuration | ErrorCategory::Validation) => 2,
        Some(ErrorCategory::Provider) => 3,
        Some(ErrorCategory::Token | ErrorCategory::Crypto) => 4,
        Some(ErrorCategory::Conformance) => 5,
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    if let Commands::Config(args) = &cli.command
        && matches!(args.command, ConfigCommands::Path)
    {
        return commands::config::path();
    }

    let client_config = config::resolve(&cli)?;

    match &cli.command {
        Commands::Discover(args) => {
            commands::discover::discover(&client_config, &args.issuer, format).await?;
        }
        Commands::Authorize(args) => {
            commands::authorize::authorize(client_config, &args.issuer, format).await?;
        }
        Commands::Token(args) => {
            commands::token::token(client_config, args, format).await?;
        }
        Commands::Config(args) => match args.command {
            ConfigCommands::Show => commands::config::show(&client_config, format)?,
            ConfigCommands::Path => commands::config::path()?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use solid_oidc_auth::{ConfigError, DiscoveryError, HttpError, PkceVerifier};

    use super::*;

    fn code_for(err: anyhow::Error) -> i32 {
        exit_code(auth_error(&err))
    }

    #[test]
    fn test_exit_code_by_category() {
        let config: Result<(), _> = Err(AuthError::from(ConfigError::Missing(
            "client_id".to_string(),
        )));
        assert_eq!(code_for(config.context("Invalid configuration").unwrap_err()), 2);

        let pkce = PkceVerifier::new("short").map_err(AuthError::from);
        assert_eq!(code_for(pkce.context("Invalid --verifier").unwrap_err()), 2);

        let discovery = AuthError::from(DiscoveryError::HttpStatus(404));
        assert_eq!(code_for(discovery.into()), 3);

        assert_eq!(code_for(AuthError::signing("boom").into()), 4);
        assert_eq!(code_for(AuthError::malformed_token("x").into()), 4);
    }

    #[test]
    fn test_exit_code_outside_library() {
        assert_eq!(code_for(anyhow::anyhow!("Cannot determine config directory")), 1);
    }

    #[test]
    fn test_auth_error_found_under_context() {
        let network: Result<(), _> = Err(AuthError::from(DiscoveryError::Network(
            HttpError::Network("connection refused".to_string()),
        )));
        let err = network.context("Discovery failed").unwrap_err();
        assert!(auth_error(&err).is_some_and(AuthError::is_retryable));
    }
}
