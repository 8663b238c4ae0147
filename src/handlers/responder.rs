use std::sync::Arc;

use async_trait::async_trait;

use crate::clients::telegram_client::TelegramClient;

/// Sends a reply back to the chat a message came from.
#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn reply(&self, chat_id: &str, text: &str) -> Result<(), String>;
}

pub struct TelegramResponder {
    client: Arc<TelegramClient>,
}

impl TelegramResponder {
    pub fn new(client: Arc<TelegramClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatResponder for TelegramResponder {
    async fn reply(&self, chat_id: &str, text: &str) -> Result<(), String> {
        self.client
            .send_message(chat_id, text)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Prints replies to stdout; used by the CLI.
pub struct ConsoleResponder;

#[async_trait]
impl ChatResponder for ConsoleResponder {
    async fn reply(&self, _chat_id: &str, text: &str) -> Result<(), String> {
        println!("{}", text);
        Ok(())
    }
}
