use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ACCOUNTS_PATH: &str = "/v1/organisation/accounts";
pub const DEFAULT_PAGE_SIZE: usize = 100;

const VALIDATION_PREFIX: &str = "validation failure list:\nvalidation failure list:\n";
const DUPLICATE_MESSAGE: &str = "Account cannot be created as it violates a duplicate constraint";

/// Account as stored and echoed by the server. Attributes are kept opaque so
/// they round-trip byte for byte.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub organisation_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub data: Account,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub links: Links,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_message: String,
}

#[derive(Clone, Debug)]
struct StoredAccount {
    key: Uuid,
    account: Account,
}

/// Accounts in insertion order, so pages are stable.
type Db = Arc<RwLock<Vec<StoredAccount>>>;

/// Error response. `message: None` produces an empty body.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: Option<String>,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn empty(status: StatusCode) -> Self {
        Self { status, message: None }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        match self.message {
            Some(error_message) => (self.status, Json(ErrorBody { error_message })).into_response(),
            None => self.status.into_response(),
        }
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/v1/health", get(health))
        .route(ACCOUNTS_PATH, get(list_accounts).post(create_account))
        .route(
            &format!("{ACCOUNTS_PATH}/{{id}}"),
            get(fetch_account).delete(delete_account),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "up" }))
}

fn self_link(id: &str) -> Links {
    Links {
        self_link: Some(format!("{ACCOUNTS_PATH}/{id}")),
        ..Links::default()
    }
}

fn parse_path_id(id: &str) -> Result<Uuid, ApiFailure> {
    Uuid::parse_str(id).map_err(|_| ApiFailure::bad_request("id is not a valid uuid"))
}

/// Collect every validation failure in the request, in field order.
fn validate(account: &Account) -> Vec<String> {
    let mut failures = Vec::new();
    if account.id.is_empty() {
        failures.push("id in body is required".to_string());
    } else if Uuid::parse_str(&account.id).is_err() {
        failures.push("id in body must be of type uuid".to_string());
    }
    if account.organisation_id.is_empty() {
        failures.push("organisation_id in body is required".to_string());
    } else if Uuid::parse_str(&account.organisation_id).is_err() {
        failures.push("organisation_id in body must be of type uuid".to_string());
    }
    if account.kind.is_empty() {
        failures.push("type in body is required".to_string());
    }
    failures
}

async fn create_account(
    State(db): State<Db>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Account>>), ApiFailure> {
    let Json(CreateRequest { data: mut account }) = payload.map_err(|rejection| {
        tracing::debug!(%rejection, "rejected create body");
        ApiFailure::bad_request(format!("invalid request body: {}", rejection.body_text()))
    })?;

    let failures = validate(&account);
    if !failures.is_empty() {
        tracing::debug!(?failures, "create failed validation");
        return Err(ApiFailure::bad_request(format!(
            "{VALIDATION_PREFIX}{}",
            failures.join("\n")
        )));
    }
    let key = parse_path_id(&account.id)?;

    let mut accounts = db.write().await;
    if accounts.iter().any(|stored| stored.key == key) {
        tracing::debug!(id = %account.id, "duplicate account");
        return Err(ApiFailure::new(StatusCode::CONFLICT, DUPLICATE_MESSAGE));
    }
    account.version = Some(account.version.unwrap_or(0));
    accounts.push(StoredAccount {
        key,
        account: account.clone(),
    });
    tracing::info!(id = %account.id, "account created");

    let links = self_link(&account.id);
    Ok((StatusCode::CREATED, Json(Envelope { data: account, links })))
}

async fn fetch_account(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Account>>, ApiFailure> {
    let key = parse_path_id(&id)?;
    let accounts = db.read().await;
    let stored = accounts
        .iter()
        .find(|stored| stored.key == key)
        .ok_or_else(|| ApiFailure::new(StatusCode::NOT_FOUND, format!("record {id} does not exist")))?;
    Ok(Json(Envelope {
        data: stored.account.clone(),
        links: self_link(&stored.account.id),
    }))
}

async fn delete_account(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<StatusCode, ApiFailure> {
    let key = parse_path_id(&id)?;
    let version: i64 = params
        .get("version")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ApiFailure::bad_request("invalid version number"))?;

    let mut accounts = db.write().await;
    let index = accounts
        .iter()
        .position(|stored| stored.key == key)
        .ok_or_else(|| ApiFailure::empty(StatusCode::NOT_FOUND))?;
    if accounts[index].account.version != Some(version) {
        return Err(ApiFailure::new(StatusCode::CONFLICT, "invalid version"));
    }
    accounts.remove(index);
    tracing::info!(%id, version, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn page_link(number: &str, size: usize) -> String {
    format!("{ACCOUNTS_PATH}?page%5Bnumber%5D={number}&page%5Bsize%5D={size}")
}

async fn list_accounts(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<Vec<Account>>>, ApiFailure> {
    let size = match params.get("page[size]") {
        None => DEFAULT_PAGE_SIZE,
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|size| (1..=DEFAULT_PAGE_SIZE).contains(size))
            .ok_or_else(|| ApiFailure::bad_request("invalid page size"))?,
    };

    let accounts = db.read().await;
    let last = accounts.len().saturating_sub(1) / size;
    // No cursor is kept between requests, so `prev` and `self` resolve to the
    // first page.
    let number = match params.get("page[number]").map(String::as_str) {
        None | Some("first") | Some("prev") | Some("self") => 0,
        Some("last") => last,
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ApiFailure::bad_request("invalid page number"))?,
    };

    let start = number.saturating_mul(size).min(accounts.len());
    let end = start.saturating_add(size).min(accounts.len());
    let data = accounts[start..end]
        .iter()
        .map(|stored| stored.account.clone())
        .collect();

    let links = Links {
        first: Some(page_link("first", size)),
        last: Some(page_link("last", size)),
        next: (number < last).then(|| page_link(&(number + 1).to_string(), size)),
        prev: (number > 0).then(|| page_link(&(number - 1).to_string(), size)),
        self_link: Some(page_link(&number.to_string(), size)),
    };
    Ok(Json(Envelope { data, links }))
}
