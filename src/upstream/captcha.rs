// src/upstream/captcha.rs

use base64::{Engine, engine::general_purpose::STANDARD};
use url::Url;

use crate::{
    models::captcha::CaptchaChallenge,
    upstream::{contract, endpoint, error::LookupError},
};

/// Fetches fresh CAPTCHA challenges from the upstream provider.
#[derive(Clone)]
pub struct CaptchaRelay {
    client: reqwest::Client,
    url: Url,
}

impl CaptchaRelay {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            url: endpoint(base_url, contract::CAPTCHA_PATH)?,
        })
    }

    /// One upstream GET, no retry. A cache-busting timestamp is appended.
    pub async fn fetch_captcha(&self) -> Result<CaptchaChallenge, LookupError> {
        let timestamp = chrono::Utc::now().timestamp_millis();

        let response = self
            .client
            .get(self.url.clone())
            .query(&[("t", timestamp)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("CAPTCHA request failed: {}", e);
                LookupError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("CAPTCHA endpoint returned {}", status);
            return Err(LookupError::UpstreamUnavailable(format!(
                "captcha endpoint returned {}",
                status
            )));
        }

        let mime = contract::captcha_mime(response.headers()).inspect_err(|e| {
            tracing::warn!("CAPTCHA response rejected: {}", e);
        })?;
        let session_cookie = contract::session_cookie(response.headers());
        let bytes = response.bytes().await?;

        if bytes.is_empty() {
            return Err(LookupError::UpstreamResponseMalformed(
                "empty captcha image".to_string(),
            ));
        }
        if session_cookie.is_empty() {
            tracing::warn!("CAPTCHA response carried no session cookie");
        }

        tracing::debug!("Relayed CAPTCHA ({} bytes, {})", bytes.len(), mime);

        Ok(CaptchaChallenge {
            image: STANDARD.encode(&bytes),
            mime,
            session_cookie,
        })
    }
}
