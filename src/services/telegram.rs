use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// One-way text channel back to an owner. Best effort: the engine logs
/// failures and moves on, it never retries or rolls anything back.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: i64, text: &str) -> Result<(), NotifyError>;

    /// Sends `body` wrapped in a fenced monospace block.
    async fn notify_monospace(&self, user_id: i64, body: &str) -> Result<(), NotifyError>;
}

// ---------------- Inbound update payloads ----------------

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

// ---------------- Bot API client ----------------

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self {
            http: Client::new(),
            token,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty()
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> Result<(), NotifyError> {
        if !self.is_configured() {
            return Err(NotifyError::Delivery(
                "TELEGRAM_BOT_TOKEN is missing in .env".to_string(),
            ));
        }

        let res = self
            .http
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        let status = res.status();
        let api: ApiResponse = res
            .json()
            .await
            .map_err(|e| NotifyError::Delivery(format!("{method} returned {status}: {e}")))?;

        if !api.ok {
            let why = api.description.unwrap_or_else(|| status.to_string());
            return Err(NotifyError::Delivery(format!("{method} rejected: {why}")));
        }

        Ok(())
    }

    pub async fn set_webhook(&self, url: &str) -> Result<(), NotifyError> {
        self.call("setWebhook", json!({ "url": url })).await
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn notify(&self, user_id: i64, text: &str) -> Result<(), NotifyError> {
        self.call("sendMessage", json!({ "chat_id": user_id, "text": text }))
            .await
    }

    async fn notify_monospace(&self, user_id: i64, body: &str) -> Result<(), NotifyError> {
        let text = format!("```\n{}\n```", escape_pre(body));
        self.call(
            "sendMessage",
            json!({ "chat_id": user_id, "text": text, "parse_mode": "MarkdownV2" }),
        )
        .await
    }
}

/// MarkdownV2 escaping for text inside a `pre` block, where only backslash
/// and backtick are special.
fn escape_pre(s: &str) -> String {
    s.replace('\\', "\\\\").replace('`', "\\`")
}
