//! Shared request building and response parsing for the service clients.
//!
//! # Design
//! `Endpoint` holds only a base URL and carries no mutable state between
//! calls. The per-service clients (`PostClient`, `CommentClient`,
//! `UserClient`) wrap one and expose a `build_*` / `parse_*` pair per remote
//! operation. The caller executes the HTTP round-trip in between, keeping the
//! core deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, APPLICATION_JSON, CONTENT_TYPE};
use crate::types::Page;

/// Base URL of one backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
}

impl Endpoint {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`, which must start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Absolute URL with an encoded query string. Empty `params` add no `?`.
    pub fn url_with_query(&self, path: &str, params: &[(&str, String)]) -> String {
        if params.is_empty() {
            return self.url(path);
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())))
            .finish();
        format!("{}{path}?{query}", self.base_url)
    }

    pub fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest {
            method,
            path: url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        url: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: url,
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            body: Some(body),
        })
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

/// Check the status and decode the JSON body.
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    check_status(response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Check the status and discard the body.
pub fn expect_empty(response: &HttpResponse) -> Result<(), ApiError> {
    check_status(response)
}

/// Check the status and unwrap a paginated response into its items.
///
/// An empty body, `null`, or an envelope with absent or `null` `content`
/// gives an empty list. A bare array is taken as the items. Anything else
/// fails with the underlying decode error.
pub fn decode_page<T: DeserializeOwned>(response: &HttpResponse) -> Result<Vec<T>, ApiError> {
    check_status(response)?;
    if response.body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value =
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        items @ Value::Array(_) => serde_json::from_value::<Vec<T>>(items),
        envelope @ Value::Object(_) => serde_json::from_value::<Page<T>>(envelope).map(|page| page.content),
        other => {
            return Err(ApiError::Deserialization(format!(
                "expected a page object or an array, found {other}"
            )))
        }
    };
    items.map_err(|e| ApiError::Deserialization(e.to_string()))
}
