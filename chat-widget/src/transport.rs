use async_trait::async_trait;
use dioxus_logger::tracing::debug;
use gloo_net::http::Request;
use thiserror::Error;
use widget_types::{WebhookReply, WebhookRequest};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("failed to parse reply: {0}")]
    Decode(String),

    #[error("failed to serialize request: {0}")]
    Encode(String),
}

/// One request, one reply. No retries and no timeout.
#[async_trait(?Send)]
pub trait WebhookTransport {
    async fn post(&self, request: &WebhookRequest) -> Result<WebhookReply, WebhookError>;
}

/// Browser `fetch` transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlooTransport {
    url: String,
}

impl GlooTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl WebhookTransport for GlooTransport {
    async fn post(&self, request: &WebhookRequest) -> Result<WebhookReply, WebhookError> {
        debug!("POST {} for session {}", self.url, request.session_id);

        let response = Request::post(&self.url)
            .json(request)
            .map_err(|e| WebhookError::Encode(e.to_string()))?
            .send()
            .await
            .map_err(|e| WebhookError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(WebhookError::Status(response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WebhookError::Network(e.to_string()))?;

        decode_reply(&body)
    }
}

/// A success body must be JSON; its shape is resolved by `WebhookReply`.
pub fn decode_reply(body: &str) -> Result<WebhookReply, WebhookError> {
    let json = serde_json::from_str::<serde_json::Value>(body)
        .map_err(|e| WebhookError::Decode(e.to_string()))?;
    Ok(WebhookReply::from_value(&json))
}
