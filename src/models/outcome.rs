use std::fmt;

pub const HELP_TEXT: &str = "Send me your calendar event like: `Meeting with John tomorrow at 4pm`";
pub const PARSE_FAILED_TEXT: &str = "Sorry, I couldn't understand the date/time. Try again.";
pub const DELIVERED_TEXT: &str = "✅ Event created on your Google Calendar!";
pub const REJECTED_TEXT: &str = "⚠️ Failed to create event. Try again later.";
pub const TRANSPORT_ERROR_TEXT: &str = "❌ Error occurred while creating event.";

/// Result of handling one inbound message. Drives the single chat reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    ParseFailed,
    Delivered,
    WebhookRejected { status: u16, body: String },
    TransportError(String),
}

impl DispatchOutcome {
    pub fn reply_text(&self) -> &'static str {
        match self {
            DispatchOutcome::ParseFailed => PARSE_FAILED_TEXT,
            DispatchOutcome::Delivered => DELIVERED_TEXT,
            DispatchOutcome::WebhookRejected { .. } => REJECTED_TEXT,
            DispatchOutcome::TransportError(_) => TRANSPORT_ERROR_TEXT,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::WebhookRejected { .. } | DispatchOutcome::TransportError(_)
        )
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::ParseFailed => write!(f, "no date/time found"),
            DispatchOutcome::Delivered => write!(f, "event delivered"),
            DispatchOutcome::WebhookRejected { status, body } => {
                write!(f, "webhook response: {} - {}", status, body)
            }
            DispatchOutcome::TransportError(detail) => {
                write!(f, "error while calling webhook: {}", detail)
            }
        }
    }
}
