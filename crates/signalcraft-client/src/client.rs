use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::Method;
use serde_json::Value;

use signalcraft_config::SyncSettings;
use signalcraft_core::IdempotencyKey;

use crate::error::{ApiError, Result};

/// Characters escaped when interpolating a value into a path segment.
/// `/` and `%` are included so external ids like `"{scope}/{name}"` stay a
/// single segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Percent-escape one path segment.
pub fn path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Successful remote response: status plus decoded JSON body, if any.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn json(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// String field at the top level of the body, e.g. a created `id`.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.body.as_ref()?.get(key)?.as_str()
    }
}

/// Stateless client for the SignalCraft REST API.
///
/// Turns a (method, path, payload, idempotency key) tuple into one REST call
/// and classifies the outcome. Performs no retries and no backoff; retry
/// policy belongs to the reconciler. Every mutating call should carry an
/// idempotency key; list/get calls are naturally safe to repeat and take
/// none.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(settings: &SyncSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: settings.api_url.as_str().trim_end_matches('/').to_string(),
            api_key: settings.api_key.expose().to_string(),
        })
    }

    /// Execute one call against `{base_url}{path}`.
    ///
    /// # Errors
    ///
    /// `ApiError::NotFound` for HTTP 404, `ApiError::Api` for any other
    /// non-2xx status (body captured verbatim), `ApiError::Transport` for
    /// connection and timeout failures, `ApiError::Decode` when a 2xx body
    /// is not valid JSON.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        idempotency_key: Option<&IdempotencyKey>,
    ) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json");

        if let Some(body) = body {
            req = req.header("Content-Type", "application/json").json(body);
        }
        if let Some(key) = idempotency_key {
            req = req.header("Idempotency-Key", key.as_str());
        }

        tracing::debug!(%method, path, "executing SignalCraft API call");
        let resp = req.send().await?;
        handle_response(resp).await
    }

    pub async fn get_json(&self, path: &str) -> Result<ApiResponse> {
        self.execute(Method::GET, path, None, None).await
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
        key: &IdempotencyKey,
    ) -> Result<ApiResponse> {
        self.execute(Method::POST, path, Some(body), Some(key)).await
    }

    pub async fn put_json(
        &self,
        path: &str,
        body: &Value,
        key: &IdempotencyKey,
    ) -> Result<ApiResponse> {
        self.execute(Method::PUT, path, Some(body), Some(key)).await
    }

    pub async fn patch_json(
        &self,
        path: &str,
        body: &Value,
        key: &IdempotencyKey,
    ) -> Result<ApiResponse> {
        self.execute(Method::PATCH, path, Some(body), Some(key)).await
    }

    pub async fn delete(&self, path: &str, key: &IdempotencyKey) -> Result<ApiResponse> {
        self.execute(Method::DELETE, path, None, Some(key)).await
    }
}

async fn handle_response(resp: reqwest::Response) -> Result<ApiResponse> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        return Err(ApiError::Api {
            status: status.as_u16(),
            body,
        });
    }

    let json = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_str(&body)?)
    };

    Ok(ApiResponse {
        status: status.as_u16(),
        body: json,
    })
}
