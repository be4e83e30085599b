// src/services/mod.rs

//! Outbound collaborators that sit beside the lookup pipeline.

pub mod advisor;
pub mod telegram;

use thiserror::Error;

pub use advisor::{Advisor, ChatAdvisor};
pub use telegram::{Notifier, TelegramNotifier};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Request(reqwest::Error),

    #[error("{service} rejected the request ({status}): {detail}")]
    Rejected {
        service: &'static str,
        status: u16,
        detail: String,
    },

    #[error("{0} returned no content")]
    EmptyResponse(&'static str),
}

impl From<reqwest::Error> for ServiceError {
    /// Drops the URL: Telegram URLs embed the bot token.
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Request(err.without_url())
    }
}
