// src/models/captcha.rs

use serde::{Deserialize, Serialize};

/// A fresh CAPTCHA obtained from the upstream provider.
///
/// Single-use: the cookie must be echoed back on exactly one result request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaChallenge {
    /// Base64 (standard alphabet, padded) of the raw image bytes.
    pub image: String,

    /// MIME type reported by the upstream, e.g. `image/png`.
    pub mime: String,

    /// Upstream `Set-Cookie` value(s), verbatim. Empty if none was sent.
    pub session_cookie: String,
}

impl CaptchaChallenge {
    /// Renders the image as a `data:` URI suitable for an `<img src>`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.image)
    }
}

/// Wire shape of `GET /api/captcha`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CaptchaResponse {
    pub img: String,
    pub cookie: String,
}

impl From<CaptchaChallenge> for CaptchaResponse {
    fn from(challenge: CaptchaChallenge) -> Self {
        Self {
            img: challenge.data_uri(),
            cookie: challenge.session_cookie,
        }
    }
}
