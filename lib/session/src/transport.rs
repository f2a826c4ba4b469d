//! JSON-over-HTTP transport for the admin panel's data layer.
//!
//! The transport sends the request, attaches the authorization header when
//! the context is authenticated, and maps non-2xx answers to
//! [`HttpError::Status`] so the session controller's `check_error` can
//! classify them.

use crate::authorizer::AuthorizationContext;
use crate::error::HttpError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Method;
use rootcause::prelude::Report;
use serde_json::Value;
use tracing::{debug, instrument};

/// Per-request options supplied by the data layer.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method. Default: GET
    pub method: Method,
    /// Extra request headers.
    pub headers: HeaderMap,
    /// Request body, sent as-is.
    pub body: Option<String>,
}

impl RequestOptions {
    /// Options for a request with `method` and no body.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: &Value) -> Self {
        self.body = Some(body.to_string());
        self
    }
}

/// A successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: String,
    /// Parsed body, when it was valid JSON.
    pub json: Option<Value>,
}

/// Sends JSON requests on behalf of the request authorizer.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and returns the parsed response.
    ///
    /// The `Authorization` header is set only when `authorization` is
    /// authenticated.
    async fn fetch_json(
        &self,
        url: &str,
        options: RequestOptions,
        authorization: &AuthorizationContext,
    ) -> Result<JsonResponse, Report<HttpError>>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that sends through `client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, options, authorization), fields(method = %options.method))]
    async fn fetch_json(
        &self,
        url: &str,
        options: RequestOptions,
        authorization: &AuthorizationContext,
    ) -> Result<JsonResponse, Report<HttpError>> {
        let mut headers = options.headers;
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        if options.body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(value) = authorization.header_value() {
            let value = HeaderValue::from_str(value).map_err(|e| HttpError::Authorization {
                details: format!("token is not a valid header value: {e}"),
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut request = self.client.request(options.method, url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| HttpError::Transport {
            details: e.to_string(),
        })?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| HttpError::Transport {
            details: format!("failed to read response body: {e}"),
        })?;
        let json = serde_json::from_str::<Value>(&body).ok();

        debug!(status = status.as_u16(), "response received");

        if !status.is_success() {
            let message = json
                .as_ref()
                .and_then(|value| value.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(HttpError::Status {
                status: status.as_u16(),
                message,
                body,
            }
            .into());
        }

        Ok(JsonResponse {
            status: status.as_u16(),
            headers,
            body,
            json,
        })
    }
}
