use std::sync::Arc;

use crate::clients::webhook_client::{WebhookClient, WebhookResult};
use crate::handlers::responder::ChatResponder;
use crate::models::message::{InboundEvent, IncomingMessage};
use crate::models::outcome::{DispatchOutcome, HELP_TEXT};
use crate::models::payload::OutboundPayload;
use crate::service::date_parser::DateTimeParser;

/// Turns one chat message into at most one webhook call and exactly one reply.
/// Holds no per-message state; every message is handled on its own.
pub struct Dispatcher {
    parser: Arc<dyn DateTimeParser>,
    webhook: Arc<dyn WebhookClient>,
}

impl Dispatcher {
    pub fn new(parser: Arc<dyn DateTimeParser>, webhook: Arc<dyn WebhookClient>) -> Self {
        Self { parser, webhook }
    }

    pub async fn handle_event(&self, responder: &dyn ChatResponder, event: InboundEvent) {
        match event {
            InboundEvent::Help { chat_id } => self.help(responder, &chat_id).await,
            InboundEvent::Text(message) => {
                self.handle(responder, &message).await;
            }
        }
    }

    pub async fn help(&self, responder: &dyn ChatResponder, chat_id: &str) {
        send_reply(responder, chat_id, HELP_TEXT).await;
    }

    pub async fn handle(
        &self,
        responder: &dyn ChatResponder,
        message: &IncomingMessage,
    ) -> DispatchOutcome {
        log::info!("Received from {}: {}", message.chat_id, message.text);
        let outcome = self.dispatch(message).await;
        match &outcome {
            DispatchOutcome::WebhookRejected { .. } | DispatchOutcome::TransportError(_) => {
                log::error!("{}", outcome)
            }
            DispatchOutcome::ParseFailed => {
                log::info!("{} in message from {}", outcome, message.chat_id)
            }
            DispatchOutcome::Delivered => {}
        }
        send_reply(responder, &message.chat_id, outcome.reply_text()).await;
        outcome
    }

    async fn dispatch(&self, message: &IncomingMessage) -> DispatchOutcome {
        let Some(datetime) = self.parser.parse(&message.text) else {
            return DispatchOutcome::ParseFailed;
        };
        let payload = OutboundPayload::new(&message.text, &datetime);
        match self.webhook.post_event(&payload).await {
            WebhookResult::Accepted => DispatchOutcome::Delivered,
            WebhookResult::Rejected { status, body } => {
                DispatchOutcome::WebhookRejected { status, body }
            }
            WebhookResult::Fault(detail) => DispatchOutcome::TransportError(detail),
        }
    }
}

async fn send_reply(responder: &dyn ChatResponder, chat_id: &str, text: &str) {
    if let Err(e) = responder.reply(chat_id, text).await {
        log::error!("Failed to reply to {}: {}", chat_id, e);
    }
}
