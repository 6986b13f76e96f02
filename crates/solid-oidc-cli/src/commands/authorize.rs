use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use solid_oidc_auth::{AuthorizationFlow, ClientConfig};

use super::http_client;
use crate::cli::OutputFormat;
use crate::output::print_json;

pub async fn authorize(config: ClientConfig, issuer: &str, format: OutputFormat) -> Result<()> {
    let http = http_client(&config)?;
    let flow = AuthorizationFlow::new(config, issuer, http);
    let request = flow
        .begin()
        .await
        .with_context(|| format!("Failed to start authorization with {issuer}"))?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "url": request.url,
            "verifier": request.verifier.as_str(),
            "challenge": request.challenge.as_str(),
        })),
        OutputFormat::Table => {
            println!("{}: {}", "Authorization URL".cyan(), request.url);
            println!("{}: {}", "Verifier".cyan(), request.verifier.as_str());
            println!();
            println!("Sign in at the URL above, then exchange the returned code:");
            println!(
                "  solid-oidc token --issuer {issuer} --code <code> --verifier {}",
                request.verifier.as_str()
            );
            Ok(())
        }
    }
}
