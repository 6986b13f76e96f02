//! Conformance checks over provider metadata and issued ID tokens.
//!
//! Each suite is a statically declared, ordered list of checks. A check
//! produces a tri-state [`CheckStatus`] plus the raw value it inspected, and
//! the [`Reporter`] joins that with the published requirement text. Nothing
//! here renders output.

mod discovery;
mod id_token;
mod link;
mod report;

pub use discovery::{DISCOVERY_CHECKS, DiscoveryCheck, run_discovery_suite};
pub use id_token::{ID_TOKEN_CHECKS, IdTokenCheck, IdTokenSuite};
pub use link::{Link, OIDC_ISSUER_REL, links_with_rel, parse_link_header};
pub use report::{
    CheckOutcome, CheckStatus, ReportEntry, Reporter, Requirement, RequirementCatalog,
};

use crate::http::HttpError;

/// Errors raised while producing a conformance report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConformanceError {
    /// A check id is absent from the requirement catalog.
    #[error("Invalid identifier: [{0}]")]
    UnknownRequirement(String),

    /// The requirement catalog could not be fetched.
    #[error("Failed to fetch requirement catalog: {0}")]
    CatalogFetch(#[from] HttpError),

    /// The requirement catalog endpoint returned a non-success status.
    #[error("Requirement catalog returned status {0}")]
    CatalogStatus(u16),

    /// The requirement catalog is not a JSON object.
    #[error("Failed to parse requirement catalog: {0}")]
    CatalogParse(String),
}
