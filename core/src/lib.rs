//! Blocking client for the accounts API.
//!
//! # Overview
//! Wraps `Account` values in the `{"data": ...}` envelope, sends them over a
//! pluggable `Transport` and decodes responses into typed results or a
//! classified `ApiError`.
//!
//! # Design
//! - `AccountsClient` holds only a base URL and a shared transport handle.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so callers may run their own I/O.
//! - The library never logs; callers own logging.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::AccountsClient;
pub use config::{ClientConfig, BASE_URL_ENV};
pub use error::{ApiError, TransportError};
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Account, AccountAttributes, AccountPage, Envelope, ErrorPayload, HealthStatus, Links, PageRequest};
