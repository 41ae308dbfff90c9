//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or error kinds. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use accounts_client::{Account, AccountPage, AccountsClient, ApiError, ClientConfig, HttpMethod, HttpRequest, HttpResponse};

const BASE_URL: &str = "http://localhost:8080";

fn client() -> AccountsClient {
    AccountsClient::new(ClientConfig::from_base_url(BASE_URL).unwrap())
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

/// Check method, URL, headers and body of a built request.
fn assert_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    match expected.get("headers") {
        Some(headers) => {
            let expected_headers: Vec<(String, String)> = headers
                .as_array()
                .unwrap()
                .iter()
                .map(|h| {
                    let arr = h.as_array().unwrap();
                    (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
                })
                .collect();
            assert_eq!(req.headers, expected_headers, "{name}: headers");
        }
        None => assert!(req.headers.is_empty(), "{name}: headers should be empty"),
    }

    match expected.get("body") {
        Some(body) => {
            let req_body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

/// Build the simulated response. `content_type` defaults to JSON; an explicit
/// `null` sends no content-type header at all.
fn simulated_response(sim: &serde_json::Value) -> HttpResponse {
    let headers = match sim.get("content_type") {
        None => vec![("content-type".to_string(), "application/json".to_string())],
        Some(serde_json::Value::Null) => Vec::new(),
        Some(value) => vec![("content-type".to_string(), value.as_str().unwrap().to_string())],
    };
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers,
        body: sim["body"].as_str().unwrap().as_bytes().to_vec(),
    }
}

fn assert_error_kind(name: &str, err: &ApiError, expected: &str) {
    let matched = match expected {
        "Validation" => matches!(err, ApiError::Validation { .. }),
        "Duplicate" => matches!(err, ApiError::Duplicate { .. }),
        "Remote" => matches!(err, ApiError::Remote { .. }),
        "MalformedResponse" => matches!(err, ApiError::MalformedResponse { .. }),
        "InvalidIdentifier" => matches!(err, ApiError::InvalidIdentifier(_)),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(matched, "{name}: expected {expected}, got {err:?}");
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let raw = include_str!("../../test-vectors/create.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: Account = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_create_account(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_create_account(simulated_response(&case["simulated_response"]));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error_kind(name, &result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let expected: Account = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

#[test]
fn fetch_test_vectors() {
    let raw = include_str!("../../test-vectors/fetch.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();
        let expected_error = case.get("expected_error").and_then(|e| e.as_str());

        let req = match c.build_fetch_account(id) {
            Ok(req) => req,
            Err(err) => {
                assert_error_kind(name, &err, expected_error.unwrap());
                continue;
            }
        };
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_fetch_account(simulated_response(&case["simulated_response"]));
        match expected_error {
            Some(expected) => assert_error_kind(name, &result.unwrap_err(), expected),
            None => {
                let expected: Account = serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(result.unwrap(), expected, "{name}: parsed result");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let raw = include_str!("../../test-vectors/delete.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();
        let version = case["input_version"].as_i64().unwrap();
        let expected_error = case.get("expected_error").and_then(|e| e.as_str());

        let req = match c.build_delete_account(id, version) {
            Ok(req) => req,
            Err(err) => {
                assert_error_kind(name, &err, expected_error.unwrap());
                continue;
            }
        };
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete_account(simulated_response(&case["simulated_response"]));
        match expected_error {
            Some(expected) => assert_error_kind(name, &result.unwrap_err(), expected),
            None => assert!(result.is_ok(), "{name}: expected success"),
        }
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/list.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let token = case["input_token"].as_str().unwrap();

        let req = c.build_list_accounts(&accounts_client::PageRequest::number(token));
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_list_accounts(simulated_response(&case["simulated_response"]));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error_kind(name, &result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let expected: AccountPage = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}
