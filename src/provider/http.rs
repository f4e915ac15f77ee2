use std::time::Duration;

use jsonrpc_core::{BoxFuture, Request, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::Provider;
use crate::error::{RequestError, Result};

/// Default RPC endpoint of a local node.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:15645";

/// The standard request timeout for RPC requests
const REQ_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider that POSTs each envelope to a node over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    url: String,
    inner: reqwest::Client,
}

impl HttpProvider {
    /// Creates a provider with the default request timeout.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, REQ_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .default_headers(HeaderMap::from_iter([(
                HeaderName::from_static("user-agent"),
                HeaderValue::from_static("drep-account-rpc"),
            )]))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            url: url.into(),
            inner,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Provider for HttpProvider {
    fn send(&self, request: Request) -> BoxFuture<Result<Option<Response>>> {
        let client = self.inner.clone();
        let url = self.url.clone();

        Box::pin(async move {
            let body = client
                .post(url.as_str())
                .json(&request)
                .send()
                .await
                .map_err(|err| {
                    tracing::warn!("request to {} failed: {}", url, err);
                    err
                })?
                .error_for_status()?
                .bytes()
                .await?;

            if body.is_empty() {
                return Ok(None);
            }

            serde_json::from_slice::<Response>(&body)
                .map(Some)
                .map_err(|err| {
                    RequestError::InvalidResponse(format!(
                        "{}: {}",
                        err,
                        String::from_utf8_lossy(&body)
                    ))
                })
        })
    }
}
