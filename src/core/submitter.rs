//! Lead submission with a local fallback queue
//!
//! A submission is sent once. When delivery fails the payload is appended to
//! the pending queue and the error is handed back to the caller. Queued leads
//! are only resent when `retry_pending` is invoked explicitly.

use chrono::Utc;
use uuid::Uuid;

use crate::core::lead::{ClientContext, DEFAULT_LEAD_SOURCE, FormInput, LeadPayload, Priority};
use crate::core::queue::{PendingQueue, QueueError};
use crate::core::transport::{LeadTransport, NetworkError, WebhookResponse};

/// Default lead webhook
pub const DEFAULT_ENDPOINT_URL: &str = "https://n8n.g2-gi.com/webhook/g2gi-leads";

/// Submission error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("{source}")]
    Network {
        #[source]
        source: NetworkError,
        /// Priority of the lead that failed to deliver
        priority: Priority,
        /// Whether the lead made it into the pending queue
        queued: bool,
    },
}

impl SubmitError {
    pub fn network_error(&self) -> &NetworkError {
        match self {
            SubmitError::Network { source, .. } => source,
        }
    }

    pub fn is_queued(&self) -> bool {
        match self {
            SubmitError::Network { queued, .. } => *queued,
        }
    }
}

/// Submitter settings, injected at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterConfig {
    pub endpoint_url: String,
    /// Tag written into `metadata.source`
    pub source: String,
}

impl SubmitterConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            source: DEFAULT_LEAD_SOURCE.to_string(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT_URL)
    }
}

/// Outcome of a manual retry pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryReport {
    /// Number of entries that were resent
    pub attempted: usize,
    /// Entries delivered and removed from the queue
    pub delivered: Vec<Uuid>,
    /// Entries that failed again and stay queued
    pub failed: Vec<(Uuid, String)>,
    /// Delivered entries that could not be removed and will be sent again next time
    pub unremoved: Vec<(Uuid, String)>,
}

impl RetryReport {
    pub fn is_empty(&self) -> bool {
        self.attempted == 0
    }

    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether every delivered entry left the queue
    pub fn all_removed(&self) -> bool {
        self.unremoved.is_empty()
    }
}

/// Sends leads to the webhook and keeps undelivered ones in a queue
#[derive(Debug)]
pub struct LeadSubmitter<T, Q> {
    config: SubmitterConfig,
    transport: T,
    queue: Q,
}

impl<T: LeadTransport, Q: PendingQueue> LeadSubmitter<T, Q> {
    pub fn new(config: SubmitterConfig, transport: T, queue: Q) -> Self {
        Self {
            config,
            transport,
            queue,
        }
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Build the payload for a form submission
    pub fn payload_for(&self, input: &FormInput, context: &ClientContext) -> LeadPayload {
        LeadPayload::build(input, context, &self.config.source, Utc::now())
    }

    /// Submit a lead, queueing it for later if delivery fails
    pub async fn submit(
        &self,
        input: &FormInput,
        context: &ClientContext,
    ) -> Result<WebhookResponse, SubmitError> {
        let payload = self.payload_for(input, context);
        self.submit_payload(payload).await
    }

    /// Send an already built payload, queueing it on failure
    pub async fn submit_payload(&self, payload: LeadPayload) -> Result<WebhookResponse, SubmitError> {
        match self.deliver(&payload).await {
            Ok(response) => Ok(response),
            Err(source) => {
                tracing::error!(email = %payload.email(), error = %source, "Failed to send lead");

                let priority = payload.priority();
                let queued = match self.queue.enqueue(payload) {
                    Ok(entry) => {
                        tracing::info!(id = %entry.id, "Lead saved to pending queue as backup");
                        true
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to save lead to pending queue");
                        false
                    }
                };

                Err(SubmitError::Network {
                    source,
                    priority,
                    queued,
                })
            }
        }
    }

    /// Resend every queued lead once
    ///
    /// Entries are sent one after another and the queue is only mutated after
    /// all outcomes are known. Failed entries stay queued as they are.
    pub async fn retry_pending(&self) -> Result<RetryReport, QueueError> {
        let entries = self.queue.dequeue_all()?;

        if entries.is_empty() {
            tracing::info!("No pending leads to resend");
            return Ok(RetryReport::default());
        }

        tracing::info!(count = entries.len(), "Resending pending leads");

        let mut report = RetryReport {
            attempted: entries.len(),
            ..Default::default()
        };
        for entry in &entries {
            match self.deliver(&entry.payload).await {
                Ok(_) => report.delivered.push(entry.id),
                Err(e) => {
                    tracing::warn!(id = %entry.id, error = %e, "Failed to resend pending lead");
                    report.failed.push((entry.id, e.to_string()));
                }
            }
        }

        for id in &report.delivered {
            match self.queue.remove(*id) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(%id, "Delivered lead was already gone from the queue");
                }
                Err(e) => {
                    tracing::error!(%id, error = %e, "Failed to remove delivered lead from pending queue");
                    report.unremoved.push((*id, e.to_string()));
                }
            }
        }

        tracing::info!(
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            unremoved = report.unremoved.len(),
            "Retry pass finished"
        );
        Ok(report)
    }

    async fn deliver(&self, payload: &LeadPayload) -> Result<WebhookResponse, NetworkError> {
        let response = self
            .transport
            .send(&self.config.endpoint_url, payload)
            .await?;
        tracing::info!(email = %payload.email(), response = %response.value(), "Lead sent to webhook");
        Ok(response)
    }
}
