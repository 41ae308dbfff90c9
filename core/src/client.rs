//! Request builder, response parser and blocking client for the accounts API.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Both halves are pure. The convenience methods (`create`, `fetch`,
//! `delete`, `list`, `health`) run build, then the configured `Transport`,
//! then parse. The client holds no mutable state, so one instance can be
//! shared across threads.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::config::ClientConfig;
use crate::envelope::{decode, decode_no_content, encode};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Account, AccountPage, Envelope, HealthStatus, PageRequest};

const ACCOUNTS_PATH: &str = "/v1/organisation/accounts";
const HEALTH_PATH: &str = "/v1/health";

/// Blocking client for the account resource.
#[derive(Clone)]
pub struct AccountsClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl AccountsClient {
    pub fn new(config: ClientConfig) -> Self {
        let (base_url, transport) = config.into_parts();
        Self {
            base_url,
            transport: transport.unwrap_or_else(|| Arc::new(UreqTransport::new())),
        }
    }

    /// Build a client from `ACCOUNTS_API_URL` with the default transport.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the transport, e.g. with one that has a timeout.
    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) {
        self.transport = transport;
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Create `account`. The server echoes it back with its assigned version.
    pub fn create(&self, account: &Account) -> Result<Account, ApiError> {
        let request = self.build_create_account(account)?;
        self.parse_create_account(self.execute(&request)?)
    }

    pub fn fetch(&self, id: &str) -> Result<Account, ApiError> {
        let request = self.build_fetch_account(id)?;
        self.parse_fetch_account(self.execute(&request)?)
    }

    /// Delete version `version` of the account. Only `204` counts as success.
    pub fn delete(&self, id: &str, version: i64) -> Result<(), ApiError> {
        let request = self.build_delete_account(id, version)?;
        self.parse_delete_account(self.execute(&request)?)
    }

    /// Fetch one page. An empty `page_token` lets the server pick the page.
    pub fn list(&self, page_token: &str) -> Result<AccountPage, ApiError> {
        self.list_page(&PageRequest::number(page_token))
    }

    pub fn list_page(&self, page: &PageRequest) -> Result<AccountPage, ApiError> {
        let request = self.build_list_accounts(page);
        self.parse_list_accounts(self.execute(&request)?)
    }

    pub fn health(&self) -> Result<HealthStatus, ApiError> {
        let request = self.build_health();
        self.parse_health(self.execute(&request)?)
    }

    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.execute(request).map_err(ApiError::Transport)
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_create_account(&self, account: &Account) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}{ACCOUNTS_PATH}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(encode(account)?),
        })
    }

    pub fn build_fetch_account(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let id = parse_id(id)?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{ACCOUNTS_PATH}/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn build_delete_account(&self, id: &str, version: i64) -> Result<HttpRequest, ApiError> {
        let id = parse_id(id)?;
        Ok(HttpRequest {
            method: HttpMethod::Delete,
            url: format!("{}{ACCOUNTS_PATH}/{id}?version={version}", self.base_url),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn build_list_accounts(&self, page: &PageRequest) -> HttpRequest {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(number) = &page.number {
            query.append_pair("page[number]", number);
        }
        if let Some(size) = page.size {
            query.append_pair("page[size]", &size.to_string());
        }
        let query = query.finish();

        let mut url = format!("{}{ACCOUNTS_PATH}", self.base_url);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_health(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{HEALTH_PATH}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    // -----------------------------------------------------------------------
    // Response parsers
    // -----------------------------------------------------------------------

    pub fn parse_create_account(&self, response: HttpResponse) -> Result<Account, ApiError> {
        decode::<Envelope<Account>>(&response).map(|envelope| envelope.data)
    }

    pub fn parse_fetch_account(&self, response: HttpResponse) -> Result<Account, ApiError> {
        decode::<Envelope<Account>>(&response).map(|envelope| envelope.data)
    }

    pub fn parse_delete_account(&self, response: HttpResponse) -> Result<(), ApiError> {
        decode_no_content(&response)
    }

    pub fn parse_list_accounts(&self, response: HttpResponse) -> Result<AccountPage, ApiError> {
        decode(&response)
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<HealthStatus, ApiError> {
        decode(&response)
    }
}

impl fmt::Debug for AccountsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Validate an account id and return its canonical hyphenated form.
fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::InvalidIdentifier(id.to_string()))
}
