use std::path::PathBuf;

use anyhow::{Context, Result};
use solid_oidc_auth::{AuthError, ClientConfig};

use crate::cli::Cli;

/// `$XDG_CONFIG_HOME/solid-oidc/config.toml` or the platform equivalent.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Cannot determine config directory")?
        .join("solid-oidc")
        .join("config.toml"))
}

/// Builds the effective client configuration.
///
/// Precedence: command-line flags and `SOLID_OIDC_*` env vars, then the
/// `--config` file (or the default file if it exists), then built-in defaults.
pub fn resolve(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let path = default_config_path()?;
            if path.exists() {
                ClientConfig::load(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
            } else {
                ClientConfig::default()
            }
        }
    };

    if let Some(client_id) = &cli.client_id {
        config.client_id = client_id.clone();
    }
    if let Some(redirect_uri) = &cli.redirect_uri {
        config.redirect_uri = redirect_uri.clone();
    }
    if let Some(spec_data) = &cli.spec_data {
        config.specification_data = Some(spec_data.clone()).filter(|s| !s.is_empty());
    }
    if cli.allow_http {
        config.http.allow_http = true;
    }

    config
        .validate()
        .map_err(AuthError::from)
        .context("Invalid configuration")?;
    Ok(config)
}
