//! Executing core `HttpRequest`s against the network.
//!
//! # Design
//! `Transport` is the seam between the façade and the network. The
//! production implementation, `ReqwestTransport`, owns one configured
//! `reqwest::Client` per backend service and does the request/response
//! logging. `StubTransport` is the test double: it records requests and
//! replays canned responses. Callers choose one at the composition root.
//!
//! A transport only returns `Err` when no response arrived. Non-2xx
//! responses are data; the core parsers classify them.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use aventura_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use tracing::{debug, error, info, warn};

use crate::config::{LogLevel, ServiceConfig};
use crate::error::ClientError;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Transport backed by a `reqwest::Client` with a fixed timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    service: &'static str,
    client_error_level: LogLevel,
}

impl ReqwestTransport {
    /// `service` names the backend in log lines.
    pub fn new(service: &'static str, config: &ServiceConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("{service} HTTP client: {e}")))?;
        Ok(Self {
            client,
            service,
            client_error_level: config.client_error_level,
        })
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let service = self.service;
        let url = request.path;
        info!(service, method = %request.method, %url, "request");

        let mut builder = self.client.request(to_reqwest(request.method), &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(service, %url, error = %e, "request failed without a response");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response.text().await.map_err(|e| {
            error!(service, %url, status, error = %e, "failed to read response body");
            ApiError::Transport(e.to_string())
        })?;

        let response = HttpResponse { status, headers, body };
        log_response(service, self.client_error_level, &url, &response);
        Ok(response)
    }
}

/// Level a response is logged at: successes at `info`, 4xx at the service's
/// configured level, everything else at `error`.
pub fn response_level(response: &HttpResponse, client_error_level: LogLevel) -> LogLevel {
    if response.is_success() {
        LogLevel::Info
    } else if response.is_client_error() {
        client_error_level
    } else {
        LogLevel::Error
    }
}

fn log_response(service: &str, client_error_level: LogLevel, url: &str, response: &HttpResponse) {
    let status = response.status;
    if response.is_success() {
        info!(service, status, url, "response");
        return;
    }
    let body = response.body.as_str();
    match response_level(response, client_error_level) {
        LogLevel::Error => error!(service, status, url, body, "response failed"),
        LogLevel::Warn => warn!(service, status, url, body, "response failed"),
        LogLevel::Info => info!(service, status, url, body, "response failed"),
        LogLevel::Debug => debug!(service, status, url, body, "response failed"),
    }
}

/// Test double that replays canned outcomes in order and records requests.
#[derive(Debug, Default)]
pub struct StubTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn reply(self, response: HttpResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queue a JSON response.
    pub fn reply_json(self, status: u16, body: serde_json::Value) -> Self {
        self.reply(HttpResponse::json(status, &body))
    }

    /// Queue a failure where no response arrives.
    pub fn fail(self, message: &str) -> Self {
        self.push(Err(ApiError::Transport(message.to_string())));
        self
    }

    pub fn push(&self, outcome: Result<HttpResponse, ApiError>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Every request executed so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.path, "stub request");
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no canned response left".to_string())))
    }
}
