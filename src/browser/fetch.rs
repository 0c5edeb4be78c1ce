//! `fetch`-based transport for the browser

use gloo_net::http::Request;

use crate::core::lead::LeadPayload;
use crate::core::transport::{LeadTransport, NetworkError, WebhookResponse};

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl LeadTransport for FetchTransport {
    async fn send(
        &self,
        endpoint: &str,
        payload: &LeadPayload,
    ) -> Result<WebhookResponse, NetworkError> {
        let request = Request::post(endpoint)
            .header("Content-Type", "application/json")
            .json(payload)
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        if !response.ok() {
            return Err(NetworkError::Status {
                status: response.status(),
                status_text: response.status_text(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::Body(e.to_string()))?;
        Ok(WebhookResponse::from_body(&body))
    }
}
