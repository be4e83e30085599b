// src/upstream/error.rs

use thiserror::Error;

/// Every way a single lookup against the upstream provider can end badly.
///
/// Failures are scoped to one in-flight lookup; none of them is fatal to the
/// process.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Network failure, timeout, or non-success HTTP status.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The provider answered, but not in any shape we understand.
    #[error("malformed upstream response: {0}")]
    UpstreamResponseMalformed(String),

    /// The query reached the fetcher with blank fields.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("result not found")]
    ResultNotFound,

    /// The provider rejected the CAPTCHA answer; its session is now spent.
    #[error("captcha rejected by upstream")]
    CaptchaInvalid,
}

/// Language for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Bn,
}

impl Locale {
    /// Picks Bengali when the first language tag of an `Accept-Language`
    /// header is `bn`, English otherwise.
    pub fn from_accept_language(header: Option<&str>) -> Self {
        let primary = header
            .and_then(|h| h.split(',').next())
            .map(|tag| tag.trim().to_ascii_lowercase());

        match primary {
            Some(tag) if tag == "bn" || tag.starts_with("bn-") || tag.starts_with("bn;") => Locale::Bn,
            _ => Locale::En,
        }
    }
}

impl LookupError {
    /// Stable machine-readable name, used in API error bodies and stats.
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::UpstreamUnavailable(_) => "upstream_unavailable",
            LookupError::UpstreamResponseMalformed(_) => "upstream_response_malformed",
            LookupError::InvalidQuery(_) => "invalid_query",
            LookupError::ResultNotFound => "result_not_found",
            LookupError::CaptchaInvalid => "captcha_invalid",
        }
    }

    /// Only transport failures are worth retrying; everything else either
    /// persists or needs the user to act.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::UpstreamUnavailable(_))
    }

    pub fn user_message(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (LookupError::UpstreamUnavailable(_), Locale::En) => {
                "The education board server is not responding. Please try again in a moment."
            }
            (LookupError::UpstreamUnavailable(_), Locale::Bn) => {
                "শিক্ষা বোর্ডের সার্ভার সাড়া দিচ্ছে না। কিছুক্ষণ পর আবার চেষ্টা করুন।"
            }
            (LookupError::UpstreamResponseMalformed(_), Locale::En) => {
                "We could not read the result returned by the board. Please try again later."
            }
            (LookupError::UpstreamResponseMalformed(_), Locale::Bn) => {
                "বোর্ড থেকে পাওয়া ফলাফল পড়া যায়নি। অনুগ্রহ করে পরে আবার চেষ্টা করুন।"
            }
            (LookupError::InvalidQuery(_), Locale::En) => "Please fill in every field correctly.",
            (LookupError::InvalidQuery(_), Locale::Bn) => "অনুগ্রহ করে সকল তথ্য সঠিকভাবে পূরণ করুন।",
            (LookupError::ResultNotFound, Locale::En) => {
                "No result found. Please check your roll, registration, board and year."
            }
            (LookupError::ResultNotFound, Locale::Bn) => {
                "কোনো ফলাফল পাওয়া যায়নি। রোল, রেজিস্ট্রেশন, বোর্ড ও সাল যাচাই করুন।"
            }
            (LookupError::CaptchaInvalid, Locale::En) => {
                "Wrong CAPTCHA. Please enter the new CAPTCHA and try again."
            }
            (LookupError::CaptchaInvalid, Locale::Bn) => {
                "ক্যাপচা সঠিক হয়নি। নতুন ক্যাপচা লিখে আবার চেষ্টা করুন।"
            }
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::UpstreamUnavailable(err.to_string())
    }
}
