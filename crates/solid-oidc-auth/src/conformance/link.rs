//! `Link` header parsing (RFC 8288), enough to find a WebID's issuer.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Relation naming the issuer trusted to assert a WebID.
pub const OIDC_ISSUER_REL: &str = "http://www.w3.org/ns/solid/terms#oidcIssuer";

/// Link values are separated by a comma followed by the next `<`. A plain
/// comma can appear inside a URI or a quoted parameter.
static LINK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*<").expect("Invalid link separator regex"));

/// One link value: a target URI plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub uri: String,
    pub params: BTreeMap<String, String>,
}

impl Link {
    /// Parses `<uri>; name="value"; ...`. Parameters without `=` are dropped
    /// and surrounding quotes are removed.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut parts = value.split(';');
        let uri = parts
            .next()
            .unwrap_or_default()
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>')
            .to_string();

        let params = parts
            .filter_map(|param| param.split_once('='))
            .map(|(name, value)| {
                let value = value.trim();
                let value = value.strip_prefix('"').unwrap_or(value);
                let value = value.strip_suffix('"').unwrap_or(value);
                (name.trim().to_ascii_lowercase(), value.to_string())
            })
            .collect();

        Self { uri, params }
    }

    /// The raw `rel` parameter.
    #[must_use]
    pub fn rel(&self) -> Option<&str> {
        self.params.get("rel").map(String::as_str)
    }

    /// Returns `true` if `rel` lists `relation` among its space-separated values.
    #[must_use]
    pub fn has_rel(&self, relation: &str) -> bool {
        self.rel()
            .is_some_and(|rel| rel.split_whitespace().any(|r| r == relation))
    }
}

/// Splits a `Link` header into its link values.
#[must_use]
pub fn parse_link_header(header: &str) -> Vec<Link> {
    LINK_SEPARATOR
        .split(header)
        .filter(|value| !value.trim().is_empty())
        .map(Link::parse)
        .collect()
}

/// Targets of every link with relation `relation`.
#[must_use]
pub fn links_with_rel<'a>(links: &'a [Link], relation: &str) -> Vec<&'a str> {
    links
        .iter()
        .filter(|link| link.has_rel(relation))
        .map(|link| link.uri.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_link() {
        let link = Link::parse(r#"<https://idp.example/>; rel="http://www.w3.org/ns/solid/terms#oidcIssuer""#);
        assert_eq!(link.uri, "https://idp.example/");
        assert_eq!(link.rel(), Some(OIDC_ISSUER_REL));
    }

    #[test]
    fn test_parse_all_params() {
        let link = Link::parse(r#"<https://a.example>; rel=describedby; type="text/turtle"; Title="x""#);
        assert_eq!(link.rel(), Some("describedby"));
        assert_eq!(link.params["type"], "text/turtle");
        assert_eq!(link.params["title"], "x");
    }

    #[test]
    fn test_params_without_value_dropped() {
        let link = Link::parse("<https://a.example>; crossorigin; rel=next");
        assert_eq!(link.params.len(), 1);
        assert_eq!(link.rel(), Some("next"));
    }

    #[test]
    fn test_parse_header_with_commas_in_uri() {
        let header = concat!(
            r#"<https://a.example/x,y>; rel="type", "#,
            r#"<https://idp.example>; rel="http://www.w3.org/ns/solid/terms#oidcIssuer","#,
            r#"<https://b.example>; rel="acl""#,
        );
        let links = parse_link_header(header);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].uri, "https://a.example/x,y");
        assert_eq!(links[1].uri, "https://idp.example");
        assert_eq!(links[2].rel(), Some("acl"));

        assert_eq!(links_with_rel(&links, OIDC_ISSUER_REL), vec!["https://idp.example"]);
    }

    #[test]
    fn test_multi_valued_rel() {
        let link = Link::parse(r#"<https://a.example>; rel="type http://www.w3.org/ns/solid/terms#oidcIssuer""#);
        assert!(link.has_rel(OIDC_ISSUER_REL));
        assert!(link.has_rel("type"));
        assert!(!link.has_rel("acl"));
    }

    #[test]
    fn test_empty_header() {
        assert!(parse_link_header("").is_empty());
    }
}
