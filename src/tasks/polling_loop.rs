use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;

use crate::clients::telegram_client::{TelegramClient, TelegramUpdate};
use crate::handlers::dispatcher::Dispatcher;
use crate::handlers::responder::{ChatResponder, TelegramResponder};
use crate::models::message::InboundEvent;

const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Polls Telegram until `shutdown` flips to true. Messages are handled one at
/// a time, in arrival order. On the way out the last fetched batch is
/// acknowledged so the next run does not see it again.
pub async fn run_polling_loop(
    telegram: Arc<TelegramClient>,
    dispatcher: Arc<Dispatcher>,
    mut shutdown: watch::Receiver<bool>,
) {
    let responder = TelegramResponder::new(telegram.clone());
    let mut offset: Option<i64> = None;
    log::info!("Bot polling started");
    while !*shutdown.borrow() {
        let polled = tokio::select! {
            polled = telegram.get_updates(offset) => polled,
            _ = shutdown.changed() => break,
        };
        match polled {
            Ok((updates, next)) => {
                offset = next;
                dispatch_updates(&dispatcher, &responder, updates).await;
            }
            Err(e) => {
                log::error!("Polling Telegram failed: {}", e);
                tokio::select! {
                    _ = sleep(RETRY_DELAY) => {}
                    _ = shutdown.changed() => break,
                }
            }
        }
    }
    if let Some(offset) = offset {
        if let Err(e) = telegram.acknowledge(offset).await {
            log::error!("Failed to acknowledge updates below {}: {}", offset, e);
        }
    }
    log::info!("Bot polling stopped");
}

pub async fn dispatch_updates(
    dispatcher: &Dispatcher,
    responder: &dyn ChatResponder,
    updates: Vec<TelegramUpdate>,
) {
    for event in updates.into_iter().filter_map(inbound_event) {
        dispatcher.handle_event(responder, event).await;
    }
}

fn inbound_event(update: TelegramUpdate) -> Option<InboundEvent> {
    let message = update.message?;
    let text = message.text?;
    let chat_id = message.chat.id.to_string();
    let event = InboundEvent::from_text(&chat_id, &text);
    if event.is_none() {
        log::debug!("Ignoring command from {}: {}", chat_id, text);
    }
    event
}
