// src/upstream/mod.rs

//! Acquisition pipeline against the upstream results provider.
//!
//! `CaptchaRelay` and `ResultFetcher` are stateless apart from a shared
//! `reqwest::Client` (connection pool only, no cookie jar). Session cookies
//! travel with each call, so concurrent lookups never see each other's state.

pub mod captcha;
pub mod contract;
pub mod error;
pub mod result;

use std::time::Duration;

use url::Url;

use crate::config::UpstreamConfig;

pub use captcha::CaptchaRelay;
pub use error::{Locale, LookupError};
pub use result::ResultFetcher;

/// Builds the outbound HTTP client shared by both pipeline halves.
pub fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .connect_timeout(config.timeout.min(Duration::from_secs(10)))
        .build()
}

/// Joins `path` onto the configured base URL, keeping any base path (`/v2`).
pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{}{}", base_url.trim_end_matches('/'), path))
}
