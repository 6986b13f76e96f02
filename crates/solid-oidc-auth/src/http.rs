//! HTTP capability.
//!
//! Discovery, JWKS retrieval, the token exchange and WebID lookups all go
//! through [`HttpFetch`]. [`ReqwestFetch`] is the production implementation;
//! tests substitute canned responses or point it at a mock server.
//!
//! # Security Considerations
//!
//! - Only HTTPS URLs are allowed unless [`HttpConfig::allow_http`] is set
//! - Requests time out after [`HttpConfig::request_timeout`]
//! - Response bodies larger than [`HttpConfig::max_response_size`] are rejected

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::HttpConfig;

/// HTTP request method. Only the two verbs a relying party needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Returns the method name as it appears on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a POST request with the given body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    /// Adds a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A received HTTP response with a fully buffered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Adds a response header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Looks up a header case-insensitively.
    ///
    /// Repeated headers are joined with `", "`, matching how they would be
    /// folded into a single field.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parses the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Transport-level failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpError {
    /// The request could not be built (bad URL, bad header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request failed before a response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body exceeds the configured limit.
    #[error("Response too large: exceeds {max_size} bytes")]
    ResponseTooLarge { max_size: usize },

    /// URL scheme is not allowed.
    #[error("Invalid URL scheme: {0} (HTTPS required)")]
    InvalidScheme(String),
}

/// Performs HTTP requests on behalf of the relying party.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Sends `request` and buffers the full response.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// [`HttpFetch`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
    config: HttpConfig,
}

impl ReqwestFetch {
    /// Builds a fetcher honoring the timeout from `config`.
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| HttpError::InvalidRequest(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Builds a fetcher with default settings.
    pub fn with_defaults() -> Result<Self, HttpError> {
        Self::new(HttpConfig::default())
    }

    fn validate_scheme(&self, url: &Url) -> Result<(), HttpError> {
        match url.scheme() {
            "https" => Ok(()),
            "http" if self.config.allow_http => Ok(()),
            other => Err(HttpError::InvalidScheme(other.to_string())),
        }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = Url::parse(&request.url)
            .map_err(|e| HttpError::InvalidRequest(format!("{}: {e}", request.url)))?;
        self.validate_scheme(&url)?;

        tracing::trace!("{} {}", request.method, url);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;

        let max_size = self.config.max_response_size;
        if let Some(len) = response.content_length()
            && len as usize > max_size
        {
            return Err(HttpError::ResponseTooLarge { max_size });
        }

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;
        if body.len() > max_size {
            return Err(HttpError::ResponseTooLarge { max_size });
        }

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
