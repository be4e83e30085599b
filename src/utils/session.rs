// src/utils/session.rs

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};

/// Storage for admin sessions issued after a successful secret check.
///
/// Injected through `AppState` so deployments can swap the in-memory store
/// for a shared one.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issues a new opaque token valid for `ttl`.
    async fn create(&self, ttl: Duration) -> String;

    async fn is_active(&self, token: &str) -> bool;

    /// Returns whether the token existed.
    async fn revoke(&self, token: &str) -> bool;
}

pub type SharedSessionStore = Arc<dyn SessionStore>;

/// Upper bound on a single session's lifetime, whatever TTL is asked for.
const MAX_SESSION_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Process-local session store; sessions die with the process.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Instant>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        // A poisoned map is still a valid map of expiry instants.
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, ttl: Duration) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl.min(MAX_SESSION_LIFETIME))
            .unwrap_or(now);

        let mut sessions = self.lock();
        sessions.retain(|_, expires_at| *expires_at > now);
        sessions.insert(token.clone(), expires_at);
        token
    }

    async fn is_active(&self, token: &str) -> bool {
        let now = Instant::now();
        let mut sessions = self.lock();
        match sessions.get(token) {
            Some(expires_at) if *expires_at > now => true,
            Some(_) => {
                sessions.remove(token);
                false
            }
            None => false,
        }
    }

    async fn revoke(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }
}

/// The validated admin token, injected into request extensions.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
}

pub fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Axum Middleware: Admin gate.
///
/// Accepts `Authorization: Bearer <token>` for a live session and injects
/// `AdminSession`. Anything else is 401.
pub async fn admin_middleware(
    State(sessions): State<SharedSessionStore>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = bearer_token(&req)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    if !sessions.is_active(&token).await {
        return Err(StatusCode::UNAUTHORIZED);
    }

    req.extensions_mut().insert(AdminSession { token });
    Ok(next.run(req).await)
}
