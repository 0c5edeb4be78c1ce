//! Lead data model
//!
//! `FormInput` is what the visitor typed; `LeadPayload` is what the webhook
//! receives: lead identity, interest, tracking metadata and a call brief for the
//! downstream voice agent.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Source tag written into every payload unless configured otherwise
pub const DEFAULT_LEAD_SOURCE: &str = "landing_page_g2gi";

/// Placeholder sent when the visitor left the phone empty
pub const PHONE_NOT_PROVIDED: &str = "No proporcionado";

/// Placeholder sent when the visitor left the message empty
pub const NO_MESSAGE: &str = "Sin mensaje adicional";

/// Referrer recorded for direct visits
pub const DIRECT_REFERRER: &str = "direct";

/// Preferred call window handed to the voice agent
pub const PREFERRED_CALL_TIME: &str = "business_hours";

/// Service labels offered in the contact form, with their call priority
pub const SERVICE_PRIORITIES: &[(&str, Priority)] = &[
    ("Automatización de Procesos", Priority::High),
    ("Análisis Predictivo", Priority::High),
    ("Automatización de Ventas", Priority::High),
    ("Chatbots Inteligentes", Priority::Medium),
    ("Machine Learning", Priority::High),
    ("Consultoría en IA", Priority::Medium),
    ("Otro", Priority::Low),
];

/// Call priority of a lead
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up the priority of a service label, `Medium` when unknown
pub fn priority_for_service(service: &str) -> Priority {
    SERVICE_PRIORITIES
        .iter()
        .find(|(label, _)| *label == service)
        .map(|(_, priority)| *priority)
        .unwrap_or_default()
}

/// Values entered in the contact form
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Display label of the selected service
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FormInput {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Environment the lead was captured in
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub user_agent: String,
    pub language: String,
    pub timezone: String,
    pub referrer: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadIdentity {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadInterest {
    pub service: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadMetadata {
    pub source: String,
    pub timestamp: String,
    pub user_agent: String,
    pub language: String,
    pub timezone: String,
    pub referrer: String,
}

/// Call brief consumed by the voice agent that follows up on the lead
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallBrief {
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub company_name: String,
    pub service_interest: String,
    pub custom_message: String,
    pub priority: Priority,
    pub preferred_call_time: String,
}

/// JSON body posted to the lead webhook
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    pub lead: LeadIdentity,
    pub interest: LeadInterest,
    pub metadata: LeadMetadata,
    pub retell_data: CallBrief,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl LeadPayload {
    pub fn build(
        input: &FormInput,
        context: &ClientContext,
        source: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let full_name = input.full_name();
        let phone = non_empty(input.phone.as_deref())
            .unwrap_or(PHONE_NOT_PROVIDED)
            .to_string();
        let message = non_empty(input.message.as_deref())
            .unwrap_or(NO_MESSAGE)
            .to_string();

        Self {
            lead: LeadIdentity {
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                full_name: full_name.clone(),
                email: input.email.clone(),
                phone: phone.clone(),
                company: input.company.clone(),
            },
            interest: LeadInterest {
                service: input.service.clone(),
                message: message.clone(),
            },
            metadata: LeadMetadata {
                source: source.to_string(),
                timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                user_agent: context.user_agent.clone(),
                language: context.language.clone(),
                timezone: context.timezone.clone(),
                referrer: non_empty(context.referrer.as_deref())
                    .unwrap_or(DIRECT_REFERRER)
                    .to_string(),
            },
            retell_data: CallBrief {
                contact_name: full_name,
                contact_phone: phone,
                contact_email: input.email.clone(),
                company_name: input.company.clone(),
                service_interest: input.service.clone(),
                custom_message: message,
                priority: priority_for_service(&input.service),
                preferred_call_time: PREFERRED_CALL_TIME.to_string(),
            },
        }
    }

    pub fn priority(&self) -> Priority {
        self.retell_data.priority
    }

    pub fn email(&self) -> &str {
        &self.lead.email
    }
}
