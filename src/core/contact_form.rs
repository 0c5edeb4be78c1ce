//! Contact form controller
//!
//! Holds the field values and the visible state of the contact modal without
//! touching any UI. Adapters forward user events to the methods here and
//! render `FormView` plus each field's feedback.

use std::time::Duration;

use crate::core::lead::{ClientContext, FormInput};
use crate::core::queue::PendingQueue;
use crate::core::submitter::{LeadSubmitter, SubmitError};
use crate::core::transport::{LeadTransport, WebhookResponse};
use crate::core::validation::{FieldKind, FormField, PRIVACY_FIELD_ID, validate_field, validate_form};

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const EMAIL: &str = "email";
pub const COMPANY: &str = "company";
pub const PHONE: &str = "phone";
pub const SERVICE: &str = "service";
pub const MESSAGE: &str = "message";

/// Alert shown when a submission could not be delivered
pub const SUBMIT_FAILED_ALERT: &str =
    "Hubo un error al enviar el formulario. Por favor, intenta nuevamente.";

/// How long the success panel stays up before the form resets
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(3000);

/// Fields of the landing page contact form
pub fn contact_fields() -> Vec<FormField> {
    vec![
        FormField::new(FIRST_NAME, FieldKind::Text).required(),
        FormField::new(LAST_NAME, FieldKind::Text).required(),
        FormField::new(EMAIL, FieldKind::Email).required(),
        FormField::new(COMPANY, FieldKind::Text).required(),
        FormField::new(PHONE, FieldKind::Tel),
        FormField::new(SERVICE, FieldKind::Select).required(),
        FormField::new(MESSAGE, FieldKind::TextArea),
    ]
}

/// Lifecycle of the lead currently held by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeadState {
    #[default]
    Draft,
    Submitting,
    Sent,
    Queued,
}

/// What the adapter should currently display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub modal_open: bool,
    pub form_visible: bool,
    pub success_visible: bool,
    /// Submit control shows its loading state and is disabled
    pub submitting: bool,
    pub alert: Option<String>,
}

impl Default for FormView {
    fn default() -> Self {
        Self {
            modal_open: false,
            form_visible: true,
            success_visible: false,
            submitting: false,
            alert: None,
        }
    }
}

/// Result of driving a submission through the form
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed or a submission is already running
    Rejected,
    /// Delivered; call `complete_reset` once `reset_after` has elapsed
    Sent {
        response: WebhookResponse,
        reset_after: Duration,
    },
    /// Not delivered; the alert is up and the form stays filled in
    Failed { error: SubmitError },
}

#[derive(Debug, Clone)]
pub struct ContactForm {
    fields: Vec<FormField>,
    view: FormView,
    state: LeadState,
    reset_delay: Duration,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new(contact_fields())
    }
}

impl ContactForm {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            view: FormView::default(),
            state: LeadState::Draft,
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }

    /// Add the required privacy consent checkbox
    pub fn with_privacy_consent(mut self) -> Self {
        if self.field(PRIVACY_FIELD_ID).is_none() {
            self.fields
                .push(FormField::new(PRIVACY_FIELD_ID, FieldKind::Checkbox).required());
        }
        self
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub fn view(&self) -> &FormView {
        &self.view
    }

    pub fn state(&self) -> LeadState {
        self.state
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn field_mut(&mut self, id: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    /// Field ids and messages of every field currently in error
    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .filter_map(|f| {
                f.feedback
                    .message
                    .as_deref()
                    .filter(|_| f.has_error())
                    .map(|m| (f.id.as_str(), m))
            })
            .collect()
    }

    pub fn open(&mut self) {
        self.view.modal_open = true;
    }

    pub fn close(&mut self) {
        self.view.modal_open = false;
    }

    pub fn backdrop_clicked(&mut self) {
        self.close();
    }

    /// Keyboard handler; Escape closes the modal when it is open
    pub fn key_pressed(&mut self, key: &str) {
        if key == "Escape" && self.view.modal_open {
            self.close();
        }
    }

    /// Input event. Re-validates only a field that is already showing an error.
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) {
        if let Some(field) = self.field_mut(id) {
            field.value = value.into();
            if field.has_error() {
                validate_field(field);
            }
        }
    }

    pub fn set_checked(&mut self, id: &str, checked: bool) {
        if let Some(field) = self.field_mut(id) {
            field.checked = checked;
            if field.has_error() {
                validate_field(field);
            }
        }
    }

    /// Blur event. Always validates the field.
    pub fn blur(&mut self, id: &str) -> bool {
        self.field_mut(id).map(validate_field).unwrap_or(true)
    }

    /// Copy the values of an input into the matching fields
    pub fn fill(&mut self, input: &FormInput) {
        self.set_value(FIRST_NAME, input.first_name.as_str());
        self.set_value(LAST_NAME, input.last_name.as_str());
        self.set_value(EMAIL, input.email.as_str());
        self.set_value(COMPANY, input.company.as_str());
        self.set_value(PHONE, input.phone.clone().unwrap_or_default());
        self.set_value(SERVICE, input.service.as_str());
        self.set_value(MESSAGE, input.message.clone().unwrap_or_default());
    }

    fn value_of(&self, id: &str) -> String {
        self.field(id).map(|f| f.value.clone()).unwrap_or_default()
    }

    fn optional_value_of(&self, id: &str) -> Option<String> {
        Some(self.value_of(id)).filter(|v| !v.is_empty())
    }

    /// Current values as a `FormInput`
    pub fn input(&self) -> FormInput {
        FormInput {
            first_name: self.value_of(FIRST_NAME),
            last_name: self.value_of(LAST_NAME),
            email: self.value_of(EMAIL),
            company: self.value_of(COMPANY),
            phone: self.optional_value_of(PHONE),
            service: self.value_of(SERVICE),
            message: self.optional_value_of(MESSAGE),
        }
    }

    /// Validate and enter the submitting state
    ///
    /// Returns `None` when any required field is invalid or a submission is
    /// already in flight.
    pub fn begin_submit(&mut self) -> Option<FormInput> {
        if self.view.submitting {
            return None;
        }
        if !validate_form(&mut self.fields) {
            return None;
        }

        self.view.submitting = true;
        self.view.alert = None;
        self.state = LeadState::Submitting;
        Some(self.input())
    }

    /// Apply the submission result to the view
    pub fn finish_submit(&mut self, result: Result<WebhookResponse, SubmitError>) -> SubmitOutcome {
        self.view.submitting = false;

        match result {
            Ok(response) => {
                self.view.form_visible = false;
                self.view.success_visible = true;
                self.state = LeadState::Sent;
                SubmitOutcome::Sent {
                    response,
                    reset_after: self.reset_delay,
                }
            }
            Err(error) => {
                tracing::error!(error = %error, "Contact form submission failed");
                self.view.alert = Some(SUBMIT_FAILED_ALERT.to_string());
                self.state = LeadState::Queued;
                SubmitOutcome::Failed { error }
            }
        }
    }

    /// Return to an empty, visible form and close the modal
    pub fn complete_reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
        self.view.form_visible = true;
        self.view.success_visible = false;
        self.view.alert = None;
        self.close();
        self.state = LeadState::Draft;
    }

    /// Validate, submit through `submitter` and update the view
    pub async fn submit<T, Q>(
        &mut self,
        submitter: &LeadSubmitter<T, Q>,
        context: &ClientContext,
    ) -> SubmitOutcome
    where
        T: LeadTransport,
        Q: PendingQueue,
    {
        let Some(input) = self.begin_submit() else {
            return SubmitOutcome::Rejected;
        };
        let result = submitter.submit(&input, context).await;
        self.finish_submit(result)
    }
}
