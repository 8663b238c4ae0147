/// A text message received from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: String,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
        }
    }
}

/// What the transport hands to the dispatcher after command recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Help { chat_id: String },
    Text(IncomingMessage),
}

impl InboundEvent {
    /// Classifies raw chat text. Commands other than `/help` yield `None`
    /// and are dropped without a reply.
    pub fn from_text(chat_id: &str, text: &str) -> Option<Self> {
        // Telegram only treats a leading `/` at offset 0 as a command.
        let Some(command) = text.strip_prefix('/') else {
            return Some(InboundEvent::Text(IncomingMessage::new(chat_id, text)));
        };
        let name = command
            .split_whitespace()
            .next()
            .unwrap_or("")
            .split('@')
            .next()
            .unwrap_or("");
        if name.eq_ignore_ascii_case("help") {
            Some(InboundEvent::Help {
                chat_id: chat_id.to_string(),
            })
        } else {
            None
        }
    }
}
