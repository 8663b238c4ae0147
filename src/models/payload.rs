use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};

/// JSON body posted to the calendar webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundPayload {
    #[serde(rename = "eventText")]
    pub event_text: String,
    pub datetime: String,
}

impl OutboundPayload {
    pub fn new(event_text: &str, datetime: &DateTime<FixedOffset>) -> Self {
        Self {
            event_text: event_text.to_string(),
            datetime: render_iso8601(datetime),
        }
    }
}

/// ISO-8601 with a numeric UTC offset, never `Z`.
pub fn render_iso8601(datetime: &DateTime<FixedOffset>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Secs, false)
}
