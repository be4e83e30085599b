// src/upstream/result.rs

use reqwest::header::{COOKIE, HeaderValue};
use url::Url;

use crate::{
    models::result::{ExamResult, ResultQuery},
    upstream::{contract, endpoint, error::LookupError},
};

/// Submits result queries to the upstream provider and normalizes the answer.
#[derive(Clone)]
pub struct ResultFetcher {
    client: reqwest::Client,
    url: Url,
}

impl ResultFetcher {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            url: endpoint(base_url, contract::RESULT_PATH)?,
        })
    }

    /// One upstream round trip. Consumes the CAPTCHA behind `query.session_cookie`
    /// whatever the outcome, so callers must not retry with the same query.
    pub async fn fetch_result(&self, query: &ResultQuery) -> Result<ExamResult, LookupError> {
        let missing = query.missing_fields();
        if !missing.is_empty() {
            return Err(LookupError::InvalidQuery(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        // Sent as-is; HeaderValue keeps the bytes untouched.
        let cookie = HeaderValue::from_str(&query.session_cookie).map_err(|_| {
            LookupError::InvalidQuery("session cookie is not a valid header value".to_string())
        })?;

        let response = self
            .client
            .post(self.url.clone())
            .header(COOKIE, cookie)
            .header(contract::REQUESTED_WITH.0, contract::REQUESTED_WITH.1)
            .form(&contract::result_form(query))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Result request failed: {}", e);
                LookupError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Result endpoint returned {}", status);
            return Err(LookupError::UpstreamUnavailable(format!(
                "result endpoint returned {}",
                status
            )));
        }

        let body = response.bytes().await?;

        contract::parse_result(&body, query).inspect_err(|e| match e {
            LookupError::UpstreamResponseMalformed(detail) => {
                tracing::error!(
                    "Malformed upstream result ({}): {}",
                    detail,
                    String::from_utf8_lossy(&body[..body.len().min(512)])
                );
            }
            other => tracing::info!(
                "Lookup {} {} {} ended: {}",
                query.exam,
                query.year,
                query.board,
                other.kind()
            ),
        })
    }
}
