// src/lookup.rs

//! Caller-side view of one lookup attempt.
//!
//! The pipeline components are stateless; the attempt's progress and the
//! retry policy live here, on the caller's side.

use std::time::Duration;

use crate::{
    models::captcha::CaptchaChallenge,
    upstream::{CaptchaRelay, LookupError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    Idle,
    CaptchaRequested,
    CaptchaReady,
    ResultSubmitted,
    ResultReady,
    ResultNotFound,
    /// Upstream rejected the answer; the only way on is a new CAPTCHA.
    CaptchaInvalid,
    UpstreamUnavailable,
    /// Malformed upstream payload or a query that should never have been sent.
    Failed,
}

#[derive(Debug, Clone, Copy)]
pub enum LookupEvent<'a> {
    RequestCaptcha,
    CaptchaIssued,
    Submit,
    ResultReceived,
    Error(&'a LookupError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: LookupState,
}

impl LookupState {
    pub fn transition(self, event: LookupEvent<'_>) -> Result<LookupState, InvalidTransition> {
        use LookupState::*;

        let next = match (self, event) {
            (Idle | CaptchaInvalid | UpstreamUnavailable, LookupEvent::RequestCaptcha) => CaptchaRequested,
            (CaptchaRequested, LookupEvent::CaptchaIssued) => CaptchaReady,
            (CaptchaReady, LookupEvent::Submit) => ResultSubmitted,
            (ResultSubmitted, LookupEvent::ResultReceived) => ResultReady,
            (CaptchaRequested | ResultSubmitted, LookupEvent::Error(err)) => match err {
                LookupError::UpstreamUnavailable(_) => UpstreamUnavailable,
                LookupError::ResultNotFound => ResultNotFound,
                LookupError::CaptchaInvalid => CaptchaInvalid,
                LookupError::UpstreamResponseMalformed(_) | LookupError::InvalidQuery(_) => Failed,
            },
            (from, _) => return Err(InvalidTransition { from }),
        };
        Ok(next)
    }

    /// `UpstreamUnavailable` only becomes terminal once the caller's retry
    /// budget is spent, so it is not reported here.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LookupState::ResultReady | LookupState::ResultNotFound | LookupState::Failed
        )
    }
}

/// Caller-side retry policy for CAPTCHA fetches.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub retries: u32,
    /// Multiplied by the attempt number (linear backoff).
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_millis(300),
        }
    }
}

/// Requests a CAPTCHA, retrying transport failures within `policy`.
///
/// Safe to retry: fetching a challenge consumes nothing upstream.
pub async fn request_captcha(
    relay: &CaptchaRelay,
    policy: RetryPolicy,
) -> Result<CaptchaChallenge, LookupError> {
    let mut state = LookupState::Idle;
    let mut attempt = 0;

    loop {
        state = advance(state, LookupEvent::RequestCaptcha);

        match relay.fetch_captcha().await {
            Ok(challenge) => {
                advance(state, LookupEvent::CaptchaIssued);
                return Ok(challenge);
            }
            Err(err) => {
                state = advance(state, LookupEvent::Error(&err));
                if state != LookupState::UpstreamUnavailable || attempt >= policy.retries {
                    return Err(err);
                }
                attempt += 1;
                tracing::warn!(
                    "CAPTCHA fetch failed, retrying ({}/{}): {}",
                    attempt,
                    policy.retries,
                    err
                );
                tokio::time::sleep(policy.backoff * attempt).await;
            }
        }
    }
}

fn advance(state: LookupState, event: LookupEvent<'_>) -> LookupState {
    state.transition(event).unwrap_or_else(|e| {
        tracing::error!("Unexpected lookup transition from {:?}", e.from);
        LookupState::Failed
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_reaches_result_ready() {
        let state = LookupState::Idle
            .transition(LookupEvent::RequestCaptcha)
            .and_then(|s| s.transition(LookupEvent::CaptchaIssued))
            .and_then(|s| s.transition(LookupEvent::Submit))
            .and_then(|s| s.transition(LookupEvent::ResultReceived))
            .unwrap();
        assert_eq!(state, LookupState::ResultReady);
        assert!(state.is_terminal());
    }

    #[test]
    fn captcha_rejection_loops_back_to_request() {
        let rejected = LookupState::ResultSubmitted
            .transition(LookupEvent::Error(&LookupError::CaptchaInvalid))
            .unwrap();
        assert_eq!(rejected, LookupState::CaptchaInvalid);
        assert!(!rejected.is_terminal());
        assert_eq!(
            rejected.transition(LookupEvent::RequestCaptcha).unwrap(),
            LookupState::CaptchaRequested
        );
        assert!(rejected.transition(LookupEvent::Submit).is_err());
    }

    #[test]
    fn error_kinds_map_to_states() {
        let from = LookupState::ResultSubmitted;
        let cases = [
            (LookupError::ResultNotFound, LookupState::ResultNotFound),
            (LookupError::UpstreamUnavailable("t".into()), LookupState::UpstreamUnavailable),
            (LookupError::UpstreamResponseMalformed("m".into()), LookupState::Failed),
        ];
        for (err, expected) in cases {
            assert_eq!(from.transition(LookupEvent::Error(&err)).unwrap(), expected);
        }
    }

    #[test]
    fn cannot_submit_without_captcha() {
        assert_eq!(
            LookupState::Idle.transition(LookupEvent::Submit),
            Err(InvalidTransition { from: LookupState::Idle })
        );
    }
}
