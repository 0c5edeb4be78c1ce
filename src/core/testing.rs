//! Test doubles shared by the unit and scenario tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::lead::{FormInput, LeadPayload};
use crate::core::queue::{KeyValueStore, MemoryStore, StorageError};
use crate::core::transport::{LeadTransport, NetworkError, WebhookResponse};

/// Transport that answers from a script, falling back to a fixed outcome
#[derive(Debug)]
pub struct ScriptedTransport {
    fallback_ok: bool,
    script: Mutex<VecDeque<Result<(), ()>>>,
    sent: Mutex<Vec<(String, LeadPayload)>>,
}

impl ScriptedTransport {
    pub fn succeeding() -> Self {
        Self::with_fallback(true)
    }

    pub fn failing() -> Self {
        Self::with_fallback(false)
    }

    fn with_fallback(fallback_ok: bool) -> Self {
        Self {
            fallback_ok,
            script: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Queue outcomes for the next calls
    pub fn script(&self, outcomes: impl IntoIterator<Item = Result<(), ()>>) {
        self.script.lock().unwrap().extend(outcomes);
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn sent(&self) -> Vec<LeadPayload> {
        self.sent.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }
}

impl LeadTransport for ScriptedTransport {
    async fn send(
        &self,
        endpoint: &str,
        payload: &LeadPayload,
    ) -> Result<WebhookResponse, NetworkError> {
        self.sent
            .lock()
            .unwrap()
            .push((endpoint.to_string(), payload.clone()));

        let ok = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .map(|outcome| outcome.is_ok())
            .unwrap_or(self.fallback_ok);

        if ok {
            Ok(WebhookResponse::from_body(""))
        } else {
            Err(NetworkError::Transport("connection refused".to_string()))
        }
    }
}

/// The lead used throughout the scenario tests
pub fn sample_input() -> FormInput {
    FormInput {
        first_name: "Ana".to_string(),
        last_name: "Ruiz".to_string(),
        email: "ana@x.com".to_string(),
        company: "Acme".to_string(),
        phone: None,
        service: "Machine Learning".to_string(),
        message: Some(String::new()),
    }
}

/// Memory store whose writes can be switched off, like a full `localStorage`
#[derive(Debug, Default)]
pub struct ReadOnlySwitchStore {
    inner: MemoryStore,
    read_only: AtomicBool,
}

impl ReadOnlySwitchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }
}

impl KeyValueStore for ReadOnlySwitchStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.inner.set_item(key, value)
    }
}
