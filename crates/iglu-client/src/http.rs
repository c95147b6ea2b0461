//! HTTP registry client.
//!
//! `GET {base}/schemas/{vendor-path}/{name}/{format}/{version}`:
//!
//! | Response | Outcome |
//! |----------|---------|
//! | 2xx, JSON body | schema found |
//! | 2xx, malformed body | `LookupError` |
//! | any other status | retried without delay, then not found |
//! | transport failure (refused, DNS, timeout) | `LookupError` naming the cause, no retry |

use std::time::Duration;

use iglu_core::SchemaKey;
use serde_json::Value;
use url::Url;

use crate::error::{ConfigError, LookupError};
use crate::registry::SourceDescriptor;

/// Additional attempts after the first non-success response.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Per-attempt request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Header carrying the registry API key.
const API_KEY_HEADER: &str = "apikey";

/// Custom `Debug` implementation redacts the API key.
#[derive(Clone)]
pub struct HttpSource {
    descriptor: SourceDescriptor,
    base: Url,
    api_key: Option<String>,
    max_retries: u32,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("descriptor", &self.descriptor)
            .field("base", &self.base.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl HttpSource {
    /// Build a registry client for `uri`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUri` if `uri` is not an absolute URL, or
    /// `ConfigError::HttpClient` if the underlying client cannot be built.
    pub fn new(descriptor: SourceDescriptor, uri: &str) -> Result<Self, ConfigError> {
        let base = Url::parse(uri).map_err(|e| ConfigError::InvalidUri {
            name: descriptor.name.clone(),
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                name: descriptor.name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            descriptor,
            base,
            api_key: None,
            max_retries: DEFAULT_MAX_RETRIES,
            client,
        })
    }

    /// Send `key` as the `apikey` header on every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    pub fn base_uri(&self) -> &Url {
        &self.base
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Full request URL for `key`.
    pub fn schema_uri(&self, key: &SchemaKey) -> String {
        format!(
            "{}/schemas/{}",
            self.base.as_str().trim_end_matches('/'),
            key.canonical_path()
        )
    }

    pub async fn lookup(&self, key: &SchemaKey) -> Result<Option<Value>, LookupError> {
        let uri = self.schema_uri(key);
        let mut retried = 0;

        loop {
            let mut request = self.client.get(&uri);
            if let Some(api_key) = &self.api_key {
                request = request.header(API_KEY_HEADER, api_key);
            }

            let response = request
                .send()
                .await
                .map_err(|e| LookupError::new(&self.descriptor.name, transport_failure(&e)))?;

            let status = response.status();
            if status.is_success() {
                let body = response.bytes().await.map_err(|e| {
                    LookupError::new(
                        &self.descriptor.name,
                        format!("reading response body from {uri}: {e}"),
                    )
                })?;
                return serde_json::from_slice(&body).map(Some).map_err(|e| {
                    LookupError::new(
                        &self.descriptor.name,
                        format!("malformed schema document from {uri}: {e}"),
                    )
                });
            }

            if retried >= self.max_retries {
                tracing::debug!(
                    registry = %self.descriptor.name,
                    %uri,
                    status = status.as_u16(),
                    "schema not found after retries"
                );
                return Ok(None);
            }

            retried += 1;
            tracing::warn!(
                registry = %self.descriptor.name,
                attempt = retried,
                max_retries = self.max_retries,
                status = status.as_u16(),
                "registry returned non-success status, retrying"
            );
        }
    }
}

/// Reason for a request that produced no response. reqwest's `Display`
/// omits the source chain, so it is appended here.
fn transport_failure(e: &reqwest::Error) -> String {
    let cause = if e.is_timeout() {
        format!("timed out after {}s", REQUEST_TIMEOUT.as_secs())
    } else if e.is_connect() {
        "connection failed".to_string()
    } else {
        "request failed".to_string()
    };
    let mut reason = format!("registry is not available, {cause}: {e}");
    let mut source = std::error::Error::source(e);
    while let Some(inner) = source {
        reason.push_str(": ");
        reason.push_str(&inner.to_string());
        source = inner.source();
    }
    reason
}
