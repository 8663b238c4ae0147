use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::models::payload::OutboundPayload;

/// What came back from one webhook POST. Every variant is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookResult {
    Accepted,
    Rejected { status: u16, body: String },
    Fault(String),
}

#[async_trait]
pub trait WebhookClient: Send + Sync {
    async fn post_event(&self, payload: &OutboundPayload) -> WebhookResult;
}

/// Posts payloads as JSON to the calendar webhook. Only HTTP 200 counts as success.
pub struct HttpWebhookClient {
    url: String,
    client: reqwest::Client,
}

impl HttpWebhookClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl WebhookClient for HttpWebhookClient {
    async fn post_event(&self, payload: &OutboundPayload) -> WebhookResult {
        let response = match self.client.post(&self.url).json(payload).send().await {
            Ok(response) => response,
            Err(err) => return WebhookResult::Fault(err.to_string()),
        };
        let status = response.status();
        if status == StatusCode::OK {
            return WebhookResult::Accepted;
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => format!("<unreadable body: {}>", err),
        };
        WebhookResult::Rejected {
            status: status.as_u16(),
            body,
        }
    }
}
