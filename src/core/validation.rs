//! Validation module for contact form fields
//!
//! Rules are evaluated in priority order and the first failing rule wins:
//! required fields must not be blank, email fields must look like
//! `local@domain.tld`, and the `privacy` checkbox must be ticked.

use std::sync::LazyLock;

use regex::Regex;

/// Id of the consent checkbox that must be accepted before submitting
pub const PRIVACY_FIELD_ID: &str = "privacy";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Input type of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Select,
    TextArea,
    Checkbox,
}

/// Field-level validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Este campo es obligatorio")]
    Required,

    #[error("Ingresa un email válido")]
    InvalidEmail,

    #[error("Debes aceptar la política de privacidad")]
    PrivacyNotAccepted,
}

/// Inline error state rendered next to a field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFeedback {
    /// Whether the field is in its error state
    pub error: bool,
    /// Message shown under the field
    pub message: Option<String>,
}

impl FieldFeedback {
    fn clear(&mut self) {
        self.error = false;
        self.message = None;
    }

    fn show(&mut self, error: FieldError) {
        self.error = true;
        self.message = Some(error.to_string());
    }
}

/// A single form control together with its current value and feedback
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub id: String,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    pub checked: bool,
    pub feedback: FieldFeedback,
}

impl FormField {
    /// Create an optional, empty field
    pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            kind,
            required: false,
            value: String::new(),
            checked: false,
            feedback: FieldFeedback::default(),
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set an initial value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn has_error(&self) -> bool {
        self.feedback.error
    }

    /// Restore the pristine state: empty value, unchecked, no feedback
    pub fn reset(&mut self) {
        self.value.clear();
        self.checked = false;
        self.feedback.clear();
    }
}

/// Check whether a string looks like `local@domain.tld`
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Evaluate the rules for a field without touching its feedback
pub fn check_field(field: &FormField) -> Result<(), FieldError> {
    if field.required && field.kind != FieldKind::Checkbox && field.value.trim().is_empty() {
        return Err(FieldError::Required);
    }

    if field.kind == FieldKind::Email && !field.value.is_empty() && !is_valid_email(&field.value) {
        return Err(FieldError::InvalidEmail);
    }

    if field.kind == FieldKind::Checkbox && field.id == PRIVACY_FIELD_ID && !field.checked {
        return Err(FieldError::PrivacyNotAccepted);
    }

    Ok(())
}

/// Validate a field and update its inline feedback
pub fn validate_field(field: &mut FormField) -> bool {
    field.feedback.clear();

    match check_field(field) {
        Ok(()) => true,
        Err(error) => {
            field.feedback.show(error);
            false
        }
    }
}

/// Validate every required field
///
/// Does not stop at the first invalid field so that all errors are shown at once.
pub fn validate_form(fields: &mut [FormField]) -> bool {
    fields
        .iter_mut()
        .filter(|field| field.required)
        .fold(true, |all_valid, field| validate_field(field) && all_valid)
}
