use anyhow::{Context, Result};
use solid_oidc_auth::conformance::{Reporter, run_discovery_suite};
use solid_oidc_auth::{AuthError, ClientConfig, OidcClient};

use super::{http_client, load_catalog};
use crate::cli::OutputFormat;
use crate::output::print_report;

pub async fn discover(config: &ClientConfig, issuer: &str, format: OutputFormat) -> Result<()> {
    let http = http_client(config)?;
    let metadata = OidcClient::new(issuer, http.clone())
        .metadata()
        .await
        .map_err(AuthError::from)
        .with_context(|| format!("Discovery failed for {issuer}"))?;

    let catalog = load_catalog(http.as_ref(), config).await;
    let entries = run_discovery_suite(&metadata, &Reporter::new(catalog.as_ref()))
        .map_err(AuthError::from)?;

    print_report(&format!("Provider metadata: {issuer}"), &entries, format)
}
