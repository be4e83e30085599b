// src/stats.rs

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::upstream::LookupError;

/// Process-local lookup outcome counters. Reset on restart.
#[derive(Debug, Default)]
pub struct LookupStats {
    success: AtomicU64,
    result_not_found: AtomicU64,
    captcha_invalid: AtomicU64,
    upstream_unavailable: AtomicU64,
    upstream_response_malformed: AtomicU64,
    invalid_query: AtomicU64,
    captchas_served: AtomicU64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub success: u64,
    pub result_not_found: u64,
    pub captcha_invalid: u64,
    pub upstream_unavailable: u64,
    pub upstream_response_malformed: u64,
    pub invalid_query: u64,
    pub captchas_served: u64,
}

impl LookupStats {
    pub fn record_captcha(&self) {
        self.captchas_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, err: &LookupError) {
        let counter = match err {
            LookupError::UpstreamUnavailable(_) => &self.upstream_unavailable,
            LookupError::UpstreamResponseMalformed(_) => &self.upstream_response_malformed,
            LookupError::InvalidQuery(_) => &self.invalid_query,
            LookupError::ResultNotFound => &self.result_not_found,
            LookupError::CaptchaInvalid => &self.captcha_invalid,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            success: self.success.load(Ordering::Relaxed),
            result_not_found: self.result_not_found.load(Ordering::Relaxed),
            captcha_invalid: self.captcha_invalid.load(Ordering::Relaxed),
            upstream_unavailable: self.upstream_unavailable.load(Ordering::Relaxed),
            upstream_response_malformed: self.upstream_response_malformed.load(Ordering::Relaxed),
            invalid_query: self.invalid_query.load(Ordering::Relaxed),
            captchas_served: self.captchas_served.load(Ordering::Relaxed),
        }
    }
}
