// src/handlers/result.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::locale_of,
    models::result::{ResultForm, ResultQuery},
    services::telegram::{lookup_summary, spawn_notification},
    state::AppState,
    upstream::LookupError,
};

/// Looks up one exam result.
///
/// * Validates the form before anything reaches the upstream provider.
/// * Performs exactly one upstream round trip; never retries.
/// * Notifies the admin chat in the background on success.
pub async fn lookup_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ResultForm>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            let message = rejection.body_text();
            state.stats.record_error(&LookupError::InvalidQuery(message.clone()));
            return Err(AppError::BadRequest(message));
        }
    };

    if let Err(validation_errors) = payload.validate() {
        let message = validation_errors.to_string();
        state.stats.record_error(&LookupError::InvalidQuery(message.clone()));
        return Err(AppError::BadRequest(message));
    }

    let query = ResultQuery::from(payload);

    let result = match state.fetcher.fetch_result(&query).await {
        Ok(result) => result,
        Err(e) => {
            state.stats.record_error(&e);
            return Err(AppError::lookup(e, locale_of(&headers)));
        }
    };

    state.stats.record_success();
    tracing::info!(
        "Result found: {} {} {} (GPA {:.2})",
        result.exam,
        result.year,
        result.board,
        result.gpa
    );

    if let Some(notifier) = &state.notifier {
        spawn_notification(notifier.clone(), lookup_summary(&result));
    }

    Ok(([(header::CACHE_CONTROL, "no-store")], Json(result)))
}
