//! Browser adapter
//!
//! Wires the core to `localStorage`, `fetch` and the page timers. Rendering is
//! left to the caller: every state change is reported through a `render`
//! callback receiving the current `ContactForm`.

mod context;
mod fetch;
mod storage;

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen_futures::spawn_local;

use crate::core::contact_form::{ContactForm, SubmitOutcome};
use crate::core::queue::StoredQueue;
use crate::core::submitter::{LeadSubmitter, SubmitterConfig};

pub use context::client_context;
pub use fetch::FetchTransport;
pub use storage::LocalStorage;

pub type BrowserSubmitter = LeadSubmitter<FetchTransport, StoredQueue<LocalStorage>>;

/// Install the panic hook and route `tracing` output to the console
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

pub fn browser_submitter(config: SubmitterConfig) -> BrowserSubmitter {
    LeadSubmitter::new(config, FetchTransport, StoredQueue::new(LocalStorage))
}

/// Handle a submit event of the contact form
///
/// Runs validation synchronously, then sends in the background. On success the
/// form is reset once the configured delay has elapsed.
pub fn submit_contact_form(
    form: Rc<RefCell<ContactForm>>,
    submitter: Rc<BrowserSubmitter>,
    render: Rc<dyn Fn(&ContactForm)>,
) {
    let started = form.borrow_mut().begin_submit();
    render(&form.borrow());

    let Some(input) = started else {
        return;
    };

    spawn_local(async move {
        let result = submitter.submit(&input, &client_context()).await;
        let outcome = form.borrow_mut().finish_submit(result);
        render(&form.borrow());

        if let SubmitOutcome::Sent { reset_after, .. } = outcome {
            TimeoutFuture::new(u32::try_from(reset_after.as_millis()).unwrap_or(u32::MAX)).await;
            form.borrow_mut().complete_reset();
            render(&form.borrow());
        }
    });
}

/// Resend leads saved in `localStorage`. Meant to be called by hand from the console,
/// optionally with a webhook URL other than the default one.
#[wasm_bindgen(js_name = retryPendingLeads)]
pub fn retry_pending_leads(endpoint_url: Option<String>) {
    let config = endpoint_url
        .map(SubmitterConfig::new)
        .unwrap_or_default();
    let submitter = browser_submitter(config);
    spawn_local(async move {
        match submitter.retry_pending().await {
            Ok(report) => tracing::info!(
                attempted = report.attempted,
                delivered = report.delivered.len(),
                failed = report.failed.len(),
                unremoved = report.unremoved.len(),
                "Pending leads retried"
            ),
            Err(e) => tracing::error!(error = %e, "Could not read pending leads"),
        }
    });
}
