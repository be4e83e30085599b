// src/handlers/recommendation.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError, models::result::ExamResult, state::AppState, utils::html::clean_html,
};

/// Asks the configured advisor for guidance on a previously fetched result.
///
/// The model's answer is sanitized before it is returned; the frontend
/// renders it as rich text.
pub async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<ExamResult>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(result) = payload?;
    let advisor = state.advisor.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Recommendations are not enabled".to_string())
    })?;

    if !(0.0..=5.0).contains(&result.gpa) || result.grades.is_empty() {
        return Err(AppError::BadRequest(
            "A complete result is required for recommendations".to_string(),
        ));
    }

    let text = advisor.recommend(&result).await?;

    Ok(Json(json!({
        "recommendation": clean_html(&text),
    })))
}
