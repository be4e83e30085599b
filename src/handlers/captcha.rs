// src/handlers/captcha.rs

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    handlers::locale_of,
    lookup::{RetryPolicy, request_captcha},
    models::captcha::CaptchaResponse,
    state::AppState,
};

/// Relays a fresh upstream CAPTCHA as `{ img, cookie }`.
///
/// Transport failures are retried within the configured budget; every call
/// is a fresh upstream hit.
pub async fn get_captcha(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let policy = RetryPolicy {
        retries: state.config.captcha_retries,
        ..RetryPolicy::default()
    };

    let challenge = request_captcha(&state.relay, policy).await.map_err(|e| {
        tracing::error!("Failed to relay CAPTCHA: {}", e);
        state.stats.record_error(&e);
        AppError::lookup(e, locale_of(&headers))
    })?;

    state.stats.record_captcha();

    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Json(CaptchaResponse::from(challenge)),
    ))
}
