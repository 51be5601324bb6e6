//! Arbitrary authenticated requests

use colored::Colorize;
use reqwest::Method;

use crate::error::{ClientError, Result};
use crate::http::client::AuthClient;
use crate::http::request::ApiRequest;

/// Parse an HTTP method name, case-insensitively
///
/// # Errors
///
/// Returns [`ClientError::InvalidRequest`] for anything other than GET, POST,
/// PUT, PATCH, DELETE, HEAD, or OPTIONS
pub fn parse_method(method: &str) -> Result<Method> {
    match method.to_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        "HEAD" => Ok(Method::HEAD),
        "OPTIONS" => Ok(Method::OPTIONS),
        other => Err(ClientError::InvalidRequest(format!(
            "Unsupported HTTP method: {}",
            other
        ))),
    }
}

/// Build the request sent by `unionsite request`
///
/// A body must be valid JSON.
pub fn build_request(method: &str, path: &str, body: Option<&str>) -> Result<ApiRequest> {
    let request = ApiRequest::new(parse_method(method)?, path);
    match body {
        Some(body) => {
            let value: serde_json::Value = serde_json::from_str(body)
                .map_err(|e| ClientError::InvalidRequest(format!("Body is not valid JSON: {}", e)))?;
            request.json(&value)
        }
        None => Ok(request),
    }
}

/// Send a request through the authenticated client and print the result
///
/// Error statuses are printed too, then returned as errors.
pub async fn send_request(
    client: &AuthClient,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> Result<()> {
    let request = build_request(method, path, body)?;
    tracing::debug!(request_id = %request.id, "Sending {} {}", request.method, request.path);

    match client.send(request).await {
        Ok(response) => {
            println!("{}", response.status.to_string().green().bold());
            println!("{}", pretty_body(&response.text()));
            Ok(())
        }
        Err(ClientError::Status { status, body }) => {
            println!("{}", status.to_string().red().bold());
            println!("{}", pretty_body(&body));
            Err(ClientError::Status { status, body })
        }
        Err(e) => Err(e),
    }
}

/// Pretty-print JSON bodies; anything else is returned unchanged
pub fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}
