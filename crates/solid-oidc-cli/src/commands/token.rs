use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use solid_oidc_auth::conformance::{IdTokenSuite, Reporter};
use solid_oidc_auth::{AuthError, AuthorizationFlow, ClientConfig, PkceVerifier};

use super::{http_client, load_catalog};
use crate::cli::{OutputFormat, TokenArgs};
use crate::output::{print_json, print_report, print_success};

pub async fn token(config: ClientConfig, args: &TokenArgs, format: OutputFormat) -> Result<()> {
    let verifier = PkceVerifier::new(args.verifier.as_str())
        .map_err(AuthError::from)
        .context("Invalid --verifier")?;
    let http = http_client(&config)?;
    let flow = AuthorizationFlow::new(config, args.issuer.as_str(), http.clone());

    let tokens = flow
        .complete(&args.code, verifier)
        .await
        .context("Token exchange failed")?;

    // The ID token must name the issuer the provider advertises, which may
    // differ from the URL given on the command line.
    let metadata = flow.metadata().await.map_err(AuthError::from)?;
    let issuer = metadata.issuer.as_deref().unwrap_or(&args.issuer);

    let catalog = load_catalog(http.as_ref(), flow.config()).await;
    let suite = IdTokenSuite::new(http.clone(), flow.config().client_id.as_str(), issuer);
    let entries = suite
        .run(&tokens, &Reporter::new(catalog.as_ref()))
        .await
        .map_err(AuthError::from)?;

    match format {
        OutputFormat::Json => print_json(&json!({ "tokens": tokens, "checks": entries })),
        OutputFormat::Table => {
            print_success(&format!(
                "Received {} token from {}",
                tokens.token_type.as_deref().unwrap_or("untyped"),
                issuer
            ));
            if let Some(scope) = &tokens.scope {
                println!("{}: {}", "Scope".cyan(), scope);
            }
            if let Some(expires_in) = tokens.expires_in {
                println!("{}: {}s", "Expires in".cyan(), expires_in);
            }
            println!();
            print_report("ID token", &entries, format)
        }
    }
}
