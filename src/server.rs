//! JSON API over HTTP
//!
//! Two resources, each with list and create:
//!
//! | Method | Path            | Success |
//! |--------|-----------------|---------|
//! | GET    | `/api/products` | 200     |
//! | POST   | `/api/products` | 201     |
//! | GET    | `/api/batches`  | 200     |
//! | POST   | `/api/batches`  | 201     |
//!
//! Errors are `{"error": "..."}` with the status of the failure kind;
//! validation failures also carry an `errors` array of field messages.
//! Requests are served one at a time on the calling thread.

use std::io::Read;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tiny_http::{Header, Response, Server};
use tracing::{debug, info, warn};

use crate::core::service::{self, ServiceError};
use crate::core::store::Store;
use crate::entities::{NewBatch, NewProduct};

/// Largest request body accepted
const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Errors starting the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot listen on {addr}: {reason}")]
    Bind { addr: String, reason: String },
}

/// A routed response: status code and JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self { status, body },
            Err(e) => Self::error(500, &format!("Failed to encode response: {}", e)),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }
}

impl From<ServiceError> for ApiResponse {
    fn from(err: ServiceError) -> Self {
        let status = err.status_code();
        debug!(kind = err.error_kind(), status, error = %err, "request rejected");
        match &err {
            ServiceError::Validation(errors) => {
                let message = errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| err.to_string());
                Self {
                    status,
                    body: json!({ "error": message, "errors": errors }),
                }
            }
            _ => Self::error(status, &err.to_string()),
        }
    }
}

/// Resolve one request against the store
///
/// Query strings and a trailing slash are ignored when matching the path.
pub fn route(store: &mut Store, method: &str, url: &str, body: &[u8]) -> ApiResponse {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };

    match (path, method) {
        ("/api/products", "GET") => respond_list(service::list_products(store)),
        ("/api/products", "POST") => match parse_body::<NewProduct>(body) {
            Ok(input) => respond_created(service::create_product(store, input)),
            Err(resp) => resp,
        },
        ("/api/batches", "GET") => respond_list(service::list_batches(store)),
        ("/api/batches", "POST") => match parse_body::<NewBatch>(body) {
            Ok(input) => respond_created(service::create_batch(store, input)),
            Err(resp) => resp,
        },
        ("/api/products" | "/api/batches", _) => ApiResponse::error(405, "Method not allowed"),
        _ => ApiResponse::error(404, "Not found"),
    }
}

fn respond_list<T: Serialize>(result: Result<Vec<T>, ServiceError>) -> ApiResponse {
    match result {
        Ok(items) => ApiResponse::ok(200, &items),
        Err(e) => e.into(),
    }
}

fn respond_created<T: Serialize>(result: Result<T, ServiceError>) -> ApiResponse {
    match result {
        Ok(record) => ApiResponse::ok(201, &record),
        Err(e) => e.into(),
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiResponse> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ApiResponse::error(400, "Invalid JSON body"))?;
    if !value.is_object() {
        return Err(ApiResponse::error(400, "Request body must be a JSON object"));
    }
    serde_json::from_value(value)
        .map_err(|e| ApiResponse::error(400, &format!("Invalid request body: {}", e)))
}

/// Read a request body of at most `limit` bytes
///
/// Larger bodies are rejected with 413 rather than truncated.
fn read_body<R: Read>(reader: R, limit: u64) -> Result<Vec<u8>, ApiResponse> {
    let mut body = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|_| ApiResponse::error(400, "Failed to read request body"))?;
    if body.len() as u64 > limit {
        return Err(ApiResponse::error(
            413,
            &format!("Request body exceeds {} bytes", limit),
        ));
    }
    Ok(body)
}

/// Serve the API until the process is stopped
pub fn serve(mut store: Store, addr: &str) -> Result<(), ServerError> {
    let server = Server::http(addr).map_err(|e| ServerError::Bind {
        addr: addr.to_string(),
        reason: e.to_string(),
    })?;
    info!(%addr, "listening");

    for mut request in server.incoming_requests() {
        let method = request.method().as_str().to_string();
        let url = request.url().to_string();

        let resp = match read_body(request.as_reader(), MAX_BODY_BYTES) {
            Ok(body) => route(&mut store, &method, &url, &body),
            Err(resp) => {
                warn!(%method, %url, status = resp.status, "rejected request body");
                resp
            }
        };

        info!(%method, %url, status = resp.status, "request");

        let mut response = Response::from_string(resp.body.to_string())
            .with_status_code(resp.status);
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
            response = response.with_header(header);
        }
        if resp.status == 405 {
            if let Ok(header) = Header::from_bytes(&b"Allow"[..], &b"GET, POST"[..]) {
                response = response.with_header(header);
            }
        }
        if let Err(e) = request.respond(response) {
            warn!(%method, %url, error = %e, "failed to send response");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    fn post(store: &mut Store, path: &str, body: Value) -> ApiResponse {
        route(store, "POST", path, body.to_string().as_bytes())
    }

    #[test]
    fn test_create_and_list_products() {
        let mut store = store();
        let resp = post(
            &mut store,
            "/api/products",
            json!({"part_number": "ab123", "product_type": "OIL_FILTER"}),
        );
        assert_eq!(resp.status, 201);
        assert_eq!(resp.body["part_number"], "AB123");
        assert_eq!(resp.body["product_type"], "OIL_FILTER");
        assert!(resp.body["id"].is_i64());

        let resp = route(&mut store, "GET", "/api/products?search=x", b"");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_validation_error_body() {
        let mut store = store();
        let resp = post(&mut store, "/api/products", json!({"part_number": "A"}));
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["error"], "Part number must be at least 2 characters");
        let errors = resp.body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1]["field"], "product_type");
    }

    #[test]
    fn test_duplicate_product_conflict() {
        let mut store = store();
        let body = json!({"part_number": "AB123", "product_type": "AIR_FILTER"});
        post(&mut store, "/api/products", body.clone());
        let resp = post(&mut store, "/api/products", json!({"part_number": "ab123", "product_type": "OIL_FILTER"}));
        assert_eq!(resp.status, 409);
        assert_eq!(resp.body, json!({"error": "Part number already exists"}));
    }

    #[test]
    fn test_batch_flow() {
        let mut store = store();
        let product = post(
            &mut store,
            "/api/products",
            json!({"part_number": "AB123", "product_type": "AIR_FILTER"}),
        );
        let product_id = product.body["id"].clone();

        let resp = post(
            &mut store,
            "/api/batches",
            json!({"batch_code": "AB123-20260215-001", "product_id": product_id, "quantity": "7"}),
        );
        assert_eq!(resp.status, 201);
        assert_eq!(resp.body["quantity"], 7);
        assert!(resp.body["updated_at"].is_null());

        let dup = post(
            &mut store,
            "/api/batches",
            json!({"batch_code": "AB123-20260215-001", "product_id": product_id, "quantity": 3}),
        );
        assert_eq!(dup.status, 409);
        assert_eq!(dup.body["error"], "Batch code already exists");

        let list = route(&mut store, "GET", "/api/batches/", b"");
        assert_eq!(list.status, 200);
        let rows = list.body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["part_number"], "AB123");
        assert_eq!(rows[0]["batch_code"], "AB123-20260215-001");
    }

    #[test]
    fn test_batch_unknown_product() {
        let mut store = store();
        let resp = post(
            &mut store,
            "/api/batches",
            json!({"batch_code": "B-1", "product_id": 99, "quantity": 1}),
        );
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body["error"], "Product not found");
    }

    #[test]
    fn test_malformed_requests() {
        let mut store = store();
        let resp = route(&mut store, "POST", "/api/batches", b"{not json");
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["error"], "Invalid JSON body");

        let resp = route(&mut store, "POST", "/api/products", b"[1, 2]");
        assert_eq!(resp.status, 400);

        let resp = post(&mut store, "/api/products", json!({"part_number": 12345}));
        assert_eq!(resp.status, 400);
    }

    #[test]
    fn test_read_body_limit() {
        let body = br#"{"part_number": "AB123"}"#;
        let limit = body.len() as u64;
        assert_eq!(read_body(&body[..], limit).unwrap(), body.to_vec());

        let resp = read_body(&body[..], limit - 1).unwrap_err();
        assert_eq!(resp.status, 413);
        assert_eq!(
            resp.body["error"],
            format!("Request body exceeds {} bytes", limit - 1)
        );

        assert!(read_body(&b""[..], MAX_BODY_BYTES).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_path_and_method() {
        let mut store = store();
        assert_eq!(route(&mut store, "GET", "/api/lots", b"").status, 404);
        assert_eq!(route(&mut store, "GET", "/", b"").status, 404);
        let resp = route(&mut store, "DELETE", "/api/products", b"");
        assert_eq!(resp.status, 405);
        assert_eq!(resp.body["error"], "Method not allowed");
    }
}
