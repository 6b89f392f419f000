//! HTTP transport backed by reqwest.

use async_trait::async_trait;
use common::Method;
use orchestrator::{ApiResponse, ErrorSet, OutgoingRequest, Transport, TransportError};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::Result;

/// Sends request intents to a JSON API.
///
/// The token, when present, goes out as `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Builds a client with reqwest's defaults; no request timeout is set.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Joins the base URL and a request path with exactly one `/`.
pub fn build_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Interprets a response body.
///
/// A success status yields `data`: the body's `data` field when it is an
/// `{data}`/`{errors}` envelope, else the whole body. An error status with a
/// JSON body yields field-keyed errors; anything else is a transport error.
pub fn parse_response(status: u16, body: &str) -> std::result::Result<ApiResponse, TransportError> {
    let json = if body.trim().is_empty() {
        Some(Value::Null)
    } else {
        serde_json::from_str::<Value>(body).ok()
    };

    let success = (200..300).contains(&status);
    match json {
        Some(Value::Object(fields))
            if fields.contains_key("data") || fields.contains_key("errors") =>
        {
            let response = ApiResponse {
                data: fields.get("data").cloned(),
                errors: fields.get("errors").map(ErrorSet::from_value),
            };
            if success || response.errors.is_some() {
                Ok(response)
            } else {
                Ok(ApiResponse::errors(ErrorSet::global(format!(
                    "Request failed with status {status}"
                ))))
            }
        }
        Some(value) if success => Ok(ApiResponse::data(value)),
        Some(Value::Null) => Err(TransportError::new(format!(
            "Request failed with status {status}"
        ))),
        Some(value) => Ok(ApiResponse::errors(ErrorSet::from_value(&value))),
        None => Err(TransportError::new(format!(
            "Unreadable response with status {status}"
        ))),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: OutgoingRequest) -> std::result::Result<ApiResponse, TransportError> {
        let url = build_url(&self.base_url, &request.path);
        let mut builder = self.client.request(to_reqwest(request.method), &url);
        if let Some(token) = &request.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        metrics::counter!("http_responses_total", "status" => status.to_string()).increment(1);
        tracing::debug!(status, bytes = text.len(), "response received");
        parse_response(status, &text)
    }
}
