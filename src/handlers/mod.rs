// src/handlers/mod.rs

pub mod admin;
pub mod captcha;
pub mod meta;
pub mod recommendation;
pub mod result;

use axum::http::{HeaderMap, header};

use crate::upstream::Locale;

/// Message language for the request, from `Accept-Language`.
pub(crate) fn locale_of(headers: &HeaderMap) -> Locale {
    Locale::from_accept_language(
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok()),
    )
}
