#![allow(dead_code)]

use std::sync::Arc;

use calendarBot::clients::webhook_client::{WebhookClient, WebhookResult};
use calendarBot::handlers::responder::ChatResponder;
use calendarBot::models::payload::OutboundPayload;
use calendarBot::service::date_parser::DateTimeParser;
use chrono::{DateTime, FixedOffset};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct RecordingResponder {
    pub replies: Mutex<Vec<(String, String)>>,
}

impl RecordingResponder {
    pub async fn texts(&self) -> Vec<String> {
        let replies = self.replies.lock().await;
        replies.iter().map(|(_, text)| text.clone()).collect()
    }
}

#[async_trait::async_trait]
impl ChatResponder for RecordingResponder {
    async fn reply(&self, chat_id: &str, text: &str) -> Result<(), String> {
        let mut replies = self.replies.lock().await;
        replies.push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

pub struct FailingResponder;

#[async_trait::async_trait]
impl ChatResponder for FailingResponder {
    async fn reply(&self, _chat_id: &str, _text: &str) -> Result<(), String> {
        Err("chat unreachable".to_string())
    }
}

/// Returns the same answer for every text and remembers what it was asked.
pub struct ScriptedParser {
    pub answer: Option<DateTime<FixedOffset>>,
    pub seen: std::sync::Mutex<Vec<String>>,
}

impl ScriptedParser {
    pub fn new(answer: Option<DateTime<FixedOffset>>) -> Self {
        Self {
            answer,
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl DateTimeParser for ScriptedParser {
    fn parse(&self, text: &str) -> Option<DateTime<FixedOffset>> {
        self.seen.lock().unwrap().push(text.to_string());
        self.answer
    }
}

pub struct RecordingWebhook {
    pub result: WebhookResult,
    pub payloads: Mutex<Vec<OutboundPayload>>,
}

impl RecordingWebhook {
    pub fn new(result: WebhookResult) -> Self {
        Self {
            result,
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub async fn calls(&self) -> usize {
        self.payloads.lock().await.len()
    }
}

#[async_trait::async_trait]
impl WebhookClient for RecordingWebhook {
    async fn post_event(&self, payload: &OutboundPayload) -> WebhookResult {
        let mut payloads = self.payloads.lock().await;
        payloads.push(payload.clone());
        self.result.clone()
    }
}

/// How the stub answers each request.
#[derive(Clone)]
pub enum StubReply {
    Status(u16, &'static str),
    DropConnection,
}

/// Minimal HTTP server on an ephemeral port. Records raw request bodies.
pub async fn spawn_http_stub(reply: StubReply) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let recorded = bodies.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let reply = reply.clone();
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let (_, body) = read_request(&mut socket).await;
                recorded.lock().await.push(body);
                match reply {
                    StubReply::Status(status, text) => {
                        let response = format!(
                            "HTTP/1.1 {} Stub\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                            status,
                            text.len(),
                            text
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                    StubReply::DropConnection => drop(socket),
                }
            });
        }
    });
    (format!("http://{}/exec", addr), bodies)
}

/// Fake Bot API. The first `getUpdates` without an offset returns `batch`;
/// every other call returns no updates. Records request lines such as
/// `GET /bott/getUpdates?timeout=30`.
pub async fn spawn_telegram_stub(batch: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let (line, _) = read_request(&mut socket).await;
                let target = line
                    .split_whitespace()
                    .take(2)
                    .collect::<Vec<_>>()
                    .join(" ");
                let body = if target.contains("getUpdates") && !target.contains("offset=") {
                    format!(r#"{{"ok":true,"result":{}}}"#, batch)
                } else if target.contains("getUpdates") {
                    r#"{"ok":true,"result":[]}"#.to_string()
                } else {
                    r#"{"ok":true,"result":{}}"#.to_string()
                };
                recorded.lock().await.push(target);
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    (format!("http://{}", addr), requests)
}

/// Returns the request line and the body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> (String, String) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.trim()
                        .eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + length {
                let line = text.lines().next().unwrap_or("").to_string();
                let body = String::from_utf8_lossy(&buf[header_end + 4..header_end + 4 + length])
                    .to_string();
                return (line, body);
            }
        }
    }
    (String::new(), String::new())
}
