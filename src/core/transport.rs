//! Outbound delivery of lead payloads to the webhook
//!
//! The webhook may answer with JSON, plain text or an empty body; all three
//! count as success as long as the status is 2xx.

use serde_json::{Value, json};

use crate::core::lead::LeadPayload;

/// Network-level delivery error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("Failed to reach webhook: {0}")]
    Transport(String),

    #[error("Webhook error: {status} {status_text}")]
    Status { status: u16, status_text: String },

    #[error("Failed to read webhook response: {0}")]
    Body(String),
}

/// Parsed webhook response body
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookResponse(pub Value);

impl WebhookResponse {
    /// Interpret a 2xx response body
    pub fn from_body(text: &str) -> Self {
        if text.is_empty() {
            return Self(json!({ "success": true }));
        }

        match serde_json::from_str(text) {
            Ok(value) => Self(value),
            Err(_) => Self(json!({ "success": true, "rawResponse": text })),
        }
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Raw body text when the webhook did not answer with JSON
    pub fn raw_response(&self) -> Option<&str> {
        self.0.get("rawResponse").and_then(Value::as_str)
    }
}

/// Sends a payload to an endpoint
#[allow(async_fn_in_trait)]
pub trait LeadTransport {
    async fn send(
        &self,
        endpoint: &str,
        payload: &LeadPayload,
    ) -> Result<WebhookResponse, NetworkError>;
}

/// reqwest-based transport for native builds
#[cfg(feature = "native")]
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

#[cfg(feature = "native")]
impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "native")]
impl LeadTransport for HttpTransport {
    async fn send(
        &self,
        endpoint: &str,
        payload: &LeadPayload,
    ) -> Result<WebhookResponse, NetworkError> {
        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::Body(e.to_string()))?;
        Ok(WebhookResponse::from_body(&body))
    }
}
