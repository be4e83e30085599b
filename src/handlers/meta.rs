// src/handlers/meta.rs

use axum::{Json, response::IntoResponse};
use serde_json::json;

use crate::models::meta::FormMeta;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Boards, exams and the year range the lookup form may offer.
pub async fn form_meta() -> impl IntoResponse {
    Json(FormMeta::current())
}
