// src/services/telegram.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::TelegramConfig,
    models::result::{ExamResult, ResultStatus},
    services::ServiceError,
};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// One-way message sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), ServiceError>;
}

/// Sends messages to a single chat through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct TelegramReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client, config: &TelegramConfig) -> Self {
        Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }

    /// Points the notifier at another Bot API server (self-hosted or a test double).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), ServiceError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        );

        let response = self
            .client
            .post(url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
                disable_web_page_preview: true,
            })
            .send()
            .await?;

        let status = response.status();
        let reply: Option<TelegramReply> = response.json().await.ok();

        match reply {
            Some(reply) if status.is_success() && reply.ok => Ok(()),
            reply => Err(ServiceError::Rejected {
                service: "telegram",
                status: status.as_u16(),
                detail: reply
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

/// Summary sent after a successful lookup. Contains no CAPTCHA or cookie data.
pub fn lookup_summary(result: &ExamResult) -> String {
    let verdict = match result.status {
        ResultStatus::Pass => "Passed",
        ResultStatus::Fail => "Failed",
    };
    format!(
        "New result lookup\nExam: {} {}\nBoard: {}\nGPA: {:.2} ({})",
        result.exam.to_uppercase(),
        result.year,
        result.board,
        result.gpa,
        verdict
    )
}

/// Fire-and-forget delivery; failures are only logged.
pub fn spawn_notification(notifier: std::sync::Arc<dyn Notifier>, text: String) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send(&text).await {
            tracing::warn!("Telegram notification failed: {}", e);
        }
    });
}
