use super::TransportError;
use crate::error_code::ErrorKind;
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::header::HeaderMap;
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use tracing::debug;

/// Thin wrapper over `reqwest::Client` bound to one provider's base URL.
///
/// Idle connections are never pooled: each call opens its own connection, which is
/// closed once the returned body stream is drained or dropped.
pub struct HttpTransport {
    client: reqwest::Client,
    provider: String,
    base_url: String,
}

/// Headers and status of a successful (2xx) response whose body has not been read yet.
pub struct StreamingResponse {
    pub status: u16,
    /// Declared `Content-Length`, when the server sent one.
    pub content_length: Option<u64>,
    pub upstream_request_id: Option<String>,
    pub body: BoxStream<'static, Bytes>,
}

impl HttpTransport {
    pub fn new(provider: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("VoiceForge/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(0);

        if let Ok(proxy_url) = env::var("VOICEFORGE_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            provider: provider.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` as JSON and return once the response headers are in.
    ///
    /// Non-2xx responses are read to completion (they are small error documents) and
    /// classified into typed errors; 2xx responses are handed back unread.
    pub async fn open_stream(
        &self,
        path: &str,
        body: &serde_json::Value,
        extra_headers: HeaderMap,
        credential: &str,
        timeout: Duration,
        request_id: &str,
    ) -> Result<StreamingResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = url.as_str(), timeout_secs = timeout.as_secs(), "opening TTS stream");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(credential)
            .headers(extra_headers)
            .header("x-request-id", request_id)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Transport(e.into()))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let headers = resp.headers().clone();
            let detail = resp.text().await.unwrap_or_default();
            return Err(classify_status(&self.provider, status, &headers, detail));
        }

        let upstream_request_id =
            header_first(resp.headers(), &["x-request-id", "request-id", "cf-ray"]);
        let content_length = resp.content_length();
        let body: BoxStream<'static, Bytes> = Box::pin(
            resp.bytes_stream()
                .map_err(|e| Error::Transport(TransportError::from(e))),
        );

        Ok(StreamingResponse {
            status,
            content_length,
            upstream_request_id,
            body,
        })
    }

    /// Authenticated GET; the caller inspects the status.
    pub async fn get(
        &self,
        path: &str,
        credential: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .get(&url)
            .bearer_auth(credential)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::Transport(e.into()))
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

/// Map a non-2xx status onto the error taxonomy.
pub(crate) fn classify_status(
    provider: &str,
    status: u16,
    headers: &HeaderMap,
    body: String,
) -> Error {
    let provider = provider.to_string();
    let detail = body.trim();
    match ErrorKind::from_http_status(status) {
        ErrorKind::AuthenticationFailure => Error::Authentication {
            provider,
            message: with_detail("Invalid API key", detail),
        },
        ErrorKind::BadRequest => Error::BadRequest {
            provider,
            message: with_detail("check text and model parameters", detail),
        },
        ErrorKind::RateLimited => Error::RateLimited {
            provider,
            message: detail.to_string(),
            retry_after_ms: retry_after_ms(headers),
        },
        _ => Error::Remote {
            provider,
            status,
            message: if detail.is_empty() {
                "API error".to_string()
            } else {
                detail.to_string()
            },
        },
    }
}

fn with_detail(summary: &str, detail: &str) -> String {
    if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{} ({})", summary, detail)
    }
}

fn header_first(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    for name in names {
        if let Some(v) = headers.get(*name) {
            if let Ok(s) = v.to_str() {
                let s = s.trim();
                if !s.is_empty() {
                    return Some(s.to_string());
                }
            }
        }
    }
    None
}

/// Best-effort parsing of `Retry-After: <seconds>`.
fn retry_after_ms(headers: &HeaderMap) -> Option<u32> {
    let raw = header_first(headers, &["retry-after"])?;
    let secs: u32 = raw.parse().ok()?;
    Some(secs.saturating_mul(1000))
}
