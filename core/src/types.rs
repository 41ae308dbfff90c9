//! Domain DTOs for the accounts API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! The wire format omits absent fields entirely. Nullable fields are
//! `Option<_>` so "absent" and "empty value" stay distinguishable; plain
//! strings and lists are skipped when empty.

use serde::{Deserialize, Serialize};

/// A single account resource.
///
/// `id` is a `String` rather than a `Uuid` so an empty id can still be sent
/// and rejected by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub organisation_id: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,
    /// Assigned by the server; `None` on first create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AccountAttributes>,
}

/// Banking attributes of an account. No cross-field rules are enforced
/// client-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_matching_opt_out: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_number: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_names: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bank_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bank_id_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_currency: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iban: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joint_account: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secondary_identification: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switched: Option<bool>,
}

/// Pagination links. Opaque URLs, passed through and never followed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Links {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

impl Links {
    pub fn is_empty(&self) -> bool {
        self == &Links::default()
    }
}

/// The `{"data": ..., "links": ...}` wrapper used by every resource response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

/// One page of accounts as returned by the list endpoint.
pub type AccountPage = Envelope<Vec<Account>>;

/// Body of every non-2xx response the server describes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub error_message: String,
}

/// Response of the health endpoint. Not enveloped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        self.status == "up"
    }
}

/// Query for one page of the account list.
///
/// `number` is an opaque token: a numeric index, `first`, `last`, `prev`,
/// `self`, or `None` for the server default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub number: Option<String>,
    pub size: Option<u32>,
}

impl PageRequest {
    /// An empty token means "server default".
    pub fn number(token: &str) -> Self {
        Self {
            number: (!token.is_empty()).then(|| token.to_string()),
            size: None,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }
}
