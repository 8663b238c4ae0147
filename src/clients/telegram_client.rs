//! Telegram Bot API: long-poll `getUpdates` and plain-text `sendMessage`.

use std::time::Duration;

use serde::Deserialize;

use crate::config::TelegramConfig;
use crate::error::TelegramError;

pub const LONG_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub chat: TelegramChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

pub struct TelegramClient {
    api_base: String,
    token: String,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        // The HTTP timeout has to outlast the long poll.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_TIMEOUT_SECS + 10))
            .build()?;
        Ok(Self {
            api_base: config.api_base.clone(),
            token: config.token.clone(),
            client,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Returns the updates and the offset to acknowledge them with.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
    ) -> Result<(Vec<TelegramUpdate>, Option<i64>), TelegramError> {
        self.fetch_updates(offset, LONG_POLL_TIMEOUT_SECS).await
    }

    /// Confirms every update below `offset` without waiting for new ones.
    /// Telegram only marks a batch as read when a later `getUpdates` carries
    /// the next offset.
    pub async fn acknowledge(&self, offset: i64) -> Result<(), TelegramError> {
        self.fetch_updates(Some(offset), 0).await.map(|_| ())
    }

    async fn fetch_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<(Vec<TelegramUpdate>, Option<i64>), TelegramError> {
        let mut query = vec![("timeout", timeout_secs.to_string())];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }
        let res = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&query)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(TelegramError::Status {
                method: "getUpdates",
                status,
                body,
            });
        }
        let data: ApiResponse<Vec<TelegramUpdate>> = res.json().await?;
        if !data.ok {
            return Err(TelegramError::NotOk("getUpdates"));
        }
        let updates = data.result.unwrap_or_default();
        let next_offset = next_offset(&updates).or(offset);
        Ok((updates, next_offset))
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TelegramError> {
        let body = serde_json::json!({ "chat_id": chat_id, "text": text });
        let res = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(TelegramError::Status {
                method: "sendMessage",
                status,
                body,
            });
        }
        Ok(())
    }
}

fn next_offset(updates: &[TelegramUpdate]) -> Option<i64> {
    updates.iter().map(|u| u.update_id).max().map(|id| id + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_updates_and_advances_offset() {
        let raw = r#"{"ok":true,"result":[
            {"update_id":7,"message":{"message_id":1,"chat":{"id":-100,"type":"group"},"text":"lunch at noon"}},
            {"update_id":9,"edited_message":{"message_id":2,"chat":{"id":5,"type":"private"}}}
        ]}"#;
        let data: ApiResponse<Vec<TelegramUpdate>> = serde_json::from_str(raw).unwrap();
        assert!(data.ok);
        let updates = data.result.unwrap();
        assert_eq!(updates.len(), 2);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, -100);
        assert_eq!(message.text.as_deref(), Some("lunch at noon"));
        assert!(updates[1].message.is_none());
        assert_eq!(next_offset(&updates), Some(10));
    }

    #[test]
    fn method_url_embeds_token() {
        let client = TelegramClient::new(&TelegramConfig {
            token: "123:abc".to_string(),
            api_base: "http://localhost:8081".to_string(),
            poll_window: None,
        })
        .unwrap();
        assert_eq!(
            client.method_url("sendMessage"),
            "http://localhost:8081/bot123:abc/sendMessage"
        );
    }
}
