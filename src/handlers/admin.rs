// src/handlers/admin.rs

use std::{sync::Arc, time::Duration};

use axum::{
    Json,
    extract::{Extension, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::admin::{AdminLoginRequest, AdminLoginResponse, NotifyRequest},
    state::AppState,
    stats::LookupStats,
    utils::{
        secret::verify_secret,
        session::{AdminSession, SharedSessionStore},
    },
};

/// Exchanges the shared admin secret for a session token.
///
/// Answers `{ success: false }` with 401 on a wrong secret.
pub async fn login(
    State(config): State<Config>,
    State(sessions): State<SharedSessionStore>,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if !verify_secret(&payload.secret, &config.admin_secret) {
        tracing::warn!("Rejected admin login attempt");
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(AdminLoginResponse {
                success: false,
                token: None,
                expires_in: None,
            }),
        ));
    }

    let token = sessions
        .create(Duration::from_secs(config.admin_session_ttl))
        .await;
    tracing::info!("Admin session started");

    Ok((
        StatusCode::OK,
        Json(AdminLoginResponse {
            success: true,
            token: Some(token),
            expires_in: Some(config.admin_session_ttl),
        }),
    ))
}

/// Ends the current admin session.
pub async fn logout(
    State(sessions): State<SharedSessionStore>,
    Extension(session): Extension<AdminSession>,
) -> impl IntoResponse {
    sessions.revoke(&session.token).await;
    tracing::info!("Admin session ended");
    StatusCode::NO_CONTENT
}

/// Reaching this handler means the admin gate accepted the token.
pub async fn session_status(Extension(_session): Extension<AdminSession>) -> impl IntoResponse {
    Json(json!({ "authenticated": true }))
}

/// Lookup outcome counters since process start.
pub async fn stats(State(stats): State<Arc<LookupStats>>) -> impl IntoResponse {
    Json(stats.snapshot())
}

/// Sends an arbitrary message to the admin Telegram chat and waits for delivery.
pub async fn notify(
    State(state): State<AppState>,
    payload: Result<Json<NotifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let notifier = state.notifier.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Telegram notifications are not configured".to_string())
    })?;

    notifier.send(&payload.message).await?;

    Ok(Json(json!({ "sent": true })))
}
