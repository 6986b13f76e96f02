pub mod authorize;
pub mod config;
pub mod discover;
pub mod token;

use std::sync::Arc;

use anyhow::{Context, Result};
use solid_oidc_auth::conformance::RequirementCatalog;
use solid_oidc_auth::{ClientConfig, HttpFetch, ReqwestFetch};

use crate::output::print_warning;

fn http_client(config: &ClientConfig) -> Result<Arc<dyn HttpFetch>> {
    let fetch = ReqwestFetch::new(config.http.clone()).context("Failed to build HTTP client")?;
    Ok(Arc::new(fetch))
}

/// Reports fall back to bare check ids when the catalog cannot be loaded.
async fn load_catalog(http: &dyn HttpFetch, config: &ClientConfig) -> Option<RequirementCatalog> {
    let url = config.specification_data.as_deref()?;
    match RequirementCatalog::fetch(http, url).await {
        Ok(catalog) => {
            tracing::debug!("Loaded {} requirements from {}", catalog.len(), url);
            Some(catalog)
        }
        Err(e) => {
            print_warning(&format!("Requirement catalog unavailable: {e}"));
            None
        }
    }
}
