//! Client configuration resolved from the environment.

use std::fmt;
use std::sync::Arc;

use crate::error::ApiError;
use crate::transport::Transport;

/// Environment variable holding the accounts API base URL.
pub const BASE_URL_ENV: &str = "ACCOUNTS_API_URL";

/// Validated base URL plus an optional injected transport.
///
/// When no transport is injected, `AccountsClient::new` creates a
/// `UreqTransport` without a timeout.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientConfig {
    /// Read the base URL from `ACCOUNTS_API_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_env_var(BASE_URL_ENV)
    }

    pub fn from_env_var(name: &str) -> Result<Self, ApiError> {
        match std::env::var(name) {
            Ok(value) if !value.trim().is_empty() => Self::from_base_url(&value),
            _ => Err(ApiError::Configuration(format!("env {name} is required"))),
        }
    }

    /// Validate `base_url` as an absolute http(s) URL. A trailing `/` is
    /// dropped so paths can be appended directly.
    pub fn from_base_url(base_url: &str) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(base_url.trim())
            .map_err(|e| ApiError::Configuration(format!("invalid base URL {base_url:?}: {e}")))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Configuration(format!(
                "base URL {base_url:?} must be an absolute http(s) URL"
            )));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ApiError::Configuration(format!(
                "base URL {base_url:?} must not carry a query or fragment"
            )));
        }
        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            transport: None,
        })
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn into_parts(self) -> (String, Option<Arc<dyn Transport>>) {
        (self.base_url, self.transport)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}
