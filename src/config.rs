// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

/// Browser-like User-Agent; the upstream board site rejects obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://eboardresults.com/v2";

pub const DEFAULT_AI_API_BASE: &str = "https://api.openai.com/v1";

pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

/// Oldest exam year the upstream archive serves.
pub const EARLIEST_EXAM_YEAR: i32 = 1996;

/// Longest admin session we hand out (30 days).
pub const MAX_ADMIN_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub rust_log: String,
    pub upstream: UpstreamConfig,
    /// Caller-side retry budget for CAPTCHA fetches.
    pub captcha_retries: u32,
    pub admin_secret: String,
    pub admin_session_ttl: u64,
    pub allowed_origins: Vec<String>,
    pub telegram: Option<TelegramConfig>,
    pub ai: Option<AiConfig>,
    /// Problems found while reading the environment. Logged by `main`
    /// once tracing is up.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let mut warnings = Vec::new();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let upstream = UpstreamConfig {
            base_url: env::var("UPSTREAM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_BASE_URL.to_string()),
            timeout: Duration::from_secs(parse_or("UPSTREAM_TIMEOUT_SECS", 20, &mut warnings)),
            user_agent: env::var("UPSTREAM_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        };

        let admin_secret = env::var("ADMIN_SECRET").expect("ADMIN_SECRET must be set");

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let telegram = match (
            non_empty_var("TELEGRAM_BOT_TOKEN"),
            non_empty_var("TELEGRAM_CHAT_ID"),
        ) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        let ai = non_empty_var("AI_API_KEY").map(|api_key| AiConfig {
            api_key,
            api_base: non_empty_var("AI_API_BASE").unwrap_or_else(|| DEFAULT_AI_API_BASE.to_string()),
            model: non_empty_var("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
        });

        let captcha_retries = parse_or("CAPTCHA_RETRIES", 2, &mut warnings);
        let admin_session_ttl = clamp_session_ttl(
            parse_or("ADMIN_SESSION_TTL_SECS", 3600, &mut warnings),
            &mut warnings,
        );

        Self {
            bind_addr,
            rust_log,
            upstream,
            captcha_retries,
            admin_secret,
            admin_session_ttl,
            allowed_origins,
            telegram,
            ai,
            warnings,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T, warnings: &mut Vec<String>) -> T {
    parse_value(name, env::var(name).ok(), default, warnings)
}

fn parse_value<T: std::str::FromStr>(
    name: &str,
    raw: Option<String>,
    default: T,
    warnings: &mut Vec<String>,
) -> T {
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warnings.push(format!("Ignoring unparsable {}={:?}, using default", name, raw));
            default
        }),
        None => default,
    }
}

fn clamp_session_ttl(secs: u64, warnings: &mut Vec<String>) -> u64 {
    if secs > MAX_ADMIN_SESSION_TTL_SECS {
        warnings.push(format!(
            "ADMIN_SESSION_TTL_SECS={} exceeds {}, clamping",
            secs, MAX_ADMIN_SESSION_TTL_SECS
        ));
        MAX_ADMIN_SESSION_TTL_SECS
    } else {
        secs
    }
}
