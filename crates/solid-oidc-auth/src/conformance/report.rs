use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ConformanceError;
use crate::http::{HttpFetch, HttpRequest};

/// Result of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    /// The check could not be decided, e.g. the inspected field is absent.
    Skip,
}

impl CheckStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }
}

impl From<Option<bool>> for CheckStatus {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Pass,
            Some(false) => Self::Fail,
            None => Self::Skip,
        }
    }
}

impl From<bool> for CheckStatus {
    fn from(value: bool) -> Self {
        Self::from(Some(value))
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A check's status and the raw value(s) it looked at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    pub inspected: Value,
}

impl CheckOutcome {
    #[must_use]
    pub fn new(status: impl Into<CheckStatus>, inspected: impl Into<Value>) -> Self {
        Self {
            status: status.into(),
            inspected: inspected.into(),
        }
    }

    /// An undecidable check.
    #[must_use]
    pub fn skip(inspected: impl Into<Value>) -> Self {
        Self::new(CheckStatus::Skip, inspected)
    }
}

/// One requirement from the published specification data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub label: String,
    /// `MUST`, `SHOULD`, `MAY`, ...
    pub requirement_level: String,
    pub statement: String,
    #[serde(default)]
    pub requirement_reference: Option<String>,
}

/// Requirements keyed by check id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementCatalog {
    requirements: HashMap<String, Requirement>,
}

impl RequirementCatalog {
    /// Reads a catalog from a JSON object keyed by check id.
    ///
    /// Members that are not requirements (such as `@context`) are ignored.
    pub fn from_value(value: Value) -> Result<Self, ConformanceError> {
        let Value::Object(members) = value else {
            return Err(ConformanceError::CatalogParse(
                "expected a JSON object".to_string(),
            ));
        };

        let requirements = members
            .into_iter()
            .filter_map(|(id, value)| {
                serde_json::from_value::<Requirement>(value)
                    .ok()
                    .map(|req| (id, req))
            })
            .collect();

        Ok(Self { requirements })
    }

    /// Fetches and parses the catalog at `url`.
    pub async fn fetch(http: &dyn HttpFetch, url: &str) -> Result<Self, ConformanceError> {
        tracing::debug!("Fetching requirement catalog from {}", url);

        let response = http
            .fetch(HttpRequest::get(url).header("Accept", "application/ld+json, application/json"))
            .await?;
        if !response.is_success() {
            return Err(ConformanceError::CatalogStatus(response.status));
        }

        let value: Value = response
            .json()
            .map_err(|e| ConformanceError::CatalogParse(e.to_string()))?;
        Self::from_value(value)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Requirement> {
        self.requirements.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

/// One row of a conformance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub id: String,
    pub label: String,
    pub level: Option<String>,
    pub status: CheckStatus,
    /// Requirement statement from the catalog.
    pub description: Option<String>,
    /// What the check verifies.
    pub message: String,
    /// Link to the requirement in the specification.
    pub uri: Option<String>,
    pub inspected: Value,
}

/// Turns check outcomes into report entries.
///
/// With a catalog, every check id must be present in it. Without one, the
/// check id doubles as the label.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter<'a> {
    catalog: Option<&'a RequirementCatalog>,
}

impl<'a> Reporter<'a> {
    #[must_use]
    pub fn new(catalog: Option<&'a RequirementCatalog>) -> Self {
        Self { catalog }
    }

    pub fn report(
        &self,
        id: &str,
        message: &str,
        outcome: CheckOutcome,
    ) -> Result<ReportEntry, ConformanceError> {
        let requirement = match self.catalog {
            Some(catalog) => Some(
                catalog
                    .get(id)
                    .ok_or_else(|| ConformanceError::UnknownRequirement(id.to_string()))?,
            ),
            None => None,
        };

        Ok(ReportEntry {
            id: id.to_string(),
            label: requirement.map_or_else(|| id.to_string(), |r| r.label.clone()),
            level: requirement.map(|r| r.requirement_level.clone()),
            status: outcome.status,
            description: requirement.map(|r| r.statement.clone()),
            message: message.to_string(),
            uri: requirement.and_then(|r| r.requirement_reference.clone()),
            inspected: outcome.inspected,
        })
    }
}
