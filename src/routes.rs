// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, captcha, meta, recommendation, result},
    state::AppState,
    utils::session::admin_middleware,
};

/// Assembles the main application router.
///
/// * Public lookup routes (captcha, result, recommendation, meta).
/// * Admin routes behind the session gate.
/// * Global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT_LANGUAGE,
        ]);

    let lookup_routes = Router::new()
        .route("/captcha", get(captcha::get_captcha))
        .route("/result", post(result::lookup_result))
        .route("/recommendation", post(recommendation::recommend))
        .route("/meta", get(meta::form_meta))
        .route("/health", get(meta::health));

    let admin_routes = Router::new()
        .route("/logout", post(admin::logout))
        .route("/session", get(admin::session_status))
        .route("/stats", get(admin::stats))
        .route("/notify", post(admin::notify))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ))
        // Login itself stays outside the gate
        .route("/login", post(admin::login));

    Router::new()
        .nest("/api", lookup_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
