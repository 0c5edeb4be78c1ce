//! Core lead-capture logic: validation, payloads, delivery and the pending queue

pub mod config;
pub mod contact_form;
#[cfg(feature = "native")]
pub mod file_store;
pub mod lead;
pub mod queue;
pub mod submitter;
pub mod transport;
pub mod validation;
#[cfg(test)]
mod testing;

pub use config::Config;
pub use contact_form::{ContactForm, FormView, LeadState, SubmitOutcome};
#[cfg(feature = "native")]
pub use file_store::FileStore;
pub use lead::{ClientContext, FormInput, LeadPayload, Priority, priority_for_service};
pub use queue::{
    KeyValueStore, MemoryStore, PendingEntry, PendingQueue, PendingStatus, QueueError,
    StorageError, StoredQueue,
};
#[cfg(feature = "native")]
pub use transport::HttpTransport;
pub use submitter::{LeadSubmitter, RetryReport, SubmitError, SubmitterConfig};
pub use transport::{LeadTransport, NetworkError, WebhookResponse};
pub use validation::{FieldError, FieldFeedback, FieldKind, FormField};
