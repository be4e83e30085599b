// tests/common/mod.rs

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use board_results::{
    config::{Config, UpstreamConfig},
    routes,
    state::AppState,
};
use serde_json::{Value, json};

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-captcha-image";
pub const GOOD_CAPTCHA: &str = "ab12";
pub const ADMIN_SECRET: &str = "test_admin_secret";

pub const ROLL_NOT_FOUND: &str = "100000";
pub const ROLL_MALFORMED: &str = "200000";
pub const ROLL_SERVER_ERROR: &str = "300000";
pub const ROLL_FAILED: &str = "400000";

/// In-process stand-in for the board results provider (plus the Telegram
/// and chat-completion APIs used by the collaborators).
#[derive(Default)]
pub struct FakeUpstream {
    pub captcha_hits: AtomicUsize,
    pub result_hits: AtomicUsize,
    /// Number of upcoming CAPTCHA requests to answer with 503.
    pub captcha_failures: AtomicUsize,
    /// Answer CAPTCHA requests with an HTML bot-challenge page.
    pub captcha_as_html: AtomicBool,
    /// Milliseconds every provider endpoint waits before answering.
    pub stall_ms: AtomicU64,
    issued: Mutex<HashSet<String>>,
    pub cookies_seen: Mutex<Vec<String>>,
    pub telegram_messages: Mutex<Vec<Value>>,
}

impl FakeUpstream {
    async fn stall(&self) {
        let ms = self.stall_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    pub fn telegram_messages(&self) -> Vec<Value> {
        self.telegram_messages.lock().unwrap().clone()
    }
}

async fn captcha(State(fake): State<Arc<FakeUpstream>>) -> Response {
    let n = fake.captcha_hits.fetch_add(1, Ordering::SeqCst);
    fake.stall().await;

    if fake.captcha_as_html.load(Ordering::SeqCst) {
        return (
            [
                (header::CONTENT_TYPE, "text/html; charset=UTF-8".to_string()),
                (header::SET_COOKIE, format!("__cf_bm=chk{:04}; path=/", n)),
            ],
            "<html><title>Attention Required!</title><body>Checking your browser</body></html>",
        )
            .into_response();
    }

    let pending = fake.captcha_failures.load(Ordering::SeqCst);
    if pending > 0 {
        fake.captcha_failures.store(pending - 1, Ordering::SeqCst);
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let session = format!("PHPSESSID=sess{:04}", n);
    fake.issued.lock().unwrap().insert(session.clone());

    (
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::SET_COOKIE, format!("{}; path=/", session)),
        ],
        PNG_BYTES,
    )
        .into_response()
}

fn success_body(form: &HashMap<String, String>, roll: &str) -> Value {
    let failed = roll == ROLL_FAILED;
    json!({
        "status": 0,
        "msg": "",
        "res": {
            "roll_no": roll,
            "reg_no": form.get("reg").cloned().unwrap_or_default(),
            "name": format!("Student {}", roll),
            "fname": "Abdul Karim",
            "mname": "Rahima Khatun",
            "stud_group": "SCIENCE",
            "dob": "01-01-2008",
            "inst_name": "ঢাকা রেসিডেনসিয়াল মডেল কলেজ",
            "session": "2022-2023",
            "gpa": if failed { "0.00" } else { "5.00" },
            "result": if failed { "F" } else { "P" }
        },
        "sub_details": [
            { "SUB_CODE": "101", "SUB_NAME": "BANGLA", "GRADE": "A+" },
            { "SUB_CODE": "107", "SUB_NAME": "ENGLISH", "GRADE": if failed { "F" } else { "A+" } },
            { "SUB_CODE": "109", "SUB_NAME": "MATHEMATICS", "GRADE": "A+" },
            { "SUB_CODE": "136", "SUB_NAME": "PHYSICS", "GRADE": "A+" }
        ]
    })
}

async fn getres(
    State(fake): State<Arc<FakeUpstream>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    fake.result_hits.fetch_add(1, Ordering::SeqCst);
    fake.stall().await;

    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    fake.cookies_seen.lock().unwrap().push(cookie.clone());

    let roll = form.get("roll").cloned().unwrap_or_default();

    if roll == ROLL_SERVER_ERROR {
        return (StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>").into_response();
    }

    // A CAPTCHA session is good for one submission only.
    let session = cookie.split(';').next().unwrap_or_default().to_string();
    let known = fake.issued.lock().unwrap().remove(&session);
    if !known || form.get("captcha").map(String::as_str) != Some(GOOD_CAPTCHA) {
        return Json(json!({ "status": 1, "msg": "Wrong captcha! Please try again." })).into_response();
    }

    // Interleave concurrent requests: later rolls answer first.
    let delay = roll.parse::<u64>().map(|r| 60 - (r % 50)).unwrap_or(0);
    tokio::time::sleep(Duration::from_millis(delay)).await;

    match roll.as_str() {
        ROLL_NOT_FOUND => Json(json!({ "status": 1, "msg": "Result Not Found" })).into_response(),
        ROLL_MALFORMED => Json(json!({
            "status": 0,
            "msg": "",
            "res": { "roll_no": roll, "name": "Partial Student" }
        }))
        .into_response(),
        _ => Json(success_body(&form, &roll)).into_response(),
    }
}

async fn telegram(
    State(fake): State<Arc<FakeUpstream>>,
    Path(bot): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !bot.starts_with("bot") {
        return (StatusCode::NOT_FOUND, Json(json!({ "ok": false }))).into_response();
    }
    fake.telegram_messages.lock().unwrap().push(body);
    Json(json!({ "ok": true, "result": {} })).into_response()
}

async fn chat_completions(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some("Bearer test-key") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
    let advice = if prompt.contains("GPA: 5.00") {
        "<b>Excellent!</b> Consider science at a top college.<script>alert(1)</script>"
    } else {
        "Keep going."
    };
    Json(json!({ "choices": [ { "message": { "role": "assistant", "content": advice } } ] }))
        .into_response()
}

/// Spawns the fake provider; returns its state and base URL (with `/v2`).
pub async fn spawn_fake_upstream() -> (Arc<FakeUpstream>, String) {
    let fake = Arc::new(FakeUpstream::default());

    let app = Router::new()
        .route("/v2/captcha", get(captcha))
        .route("/v2/getres", post(getres))
        .route("/tg/{bot}/sendMessage", post(telegram))
        .route("/ai/chat/completions", post(chat_completions))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (fake, format!("http://127.0.0.1:{}/v2", port))
}

pub fn test_config(upstream_base: &str) -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        rust_log: "error".to_string(),
        upstream: UpstreamConfig {
            base_url: upstream_base.to_string(),
            timeout: Duration::from_secs(5),
            ..UpstreamConfig::default()
        },
        captcha_retries: 2,
        admin_secret: ADMIN_SECRET.to_string(),
        admin_session_ttl: 600,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        telegram: None,
        ai: None,
        warnings: Vec::new(),
    }
}

/// Spawns the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app(state: AppState) -> String {
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}
