// src/state.rs

use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use thiserror::Error;

use crate::{
    config::Config,
    services::{Advisor, ChatAdvisor, Notifier, TelegramNotifier},
    stats::LookupStats,
    upstream::{self, CaptchaRelay, ResultFetcher},
    utils::session::{MemorySessionStore, SharedSessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub relay: CaptchaRelay,
    pub fetcher: ResultFetcher,
    pub sessions: SharedSessionStore,
    pub stats: Arc<LookupStats>,
    /// Present only when Telegram credentials are configured.
    pub notifier: Option<Arc<dyn Notifier>>,
    /// Present only when an AI API key is configured.
    pub advisor: Option<Arc<dyn Advisor>>,
}

#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid UPSTREAM_BASE_URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

impl AppState {
    /// Wires the pipeline and collaborators from configuration, with an
    /// in-memory admin session store.
    pub fn from_config(config: Config) -> Result<Self, InitError> {
        let upstream_client = upstream::build_client(&config.upstream)?;
        let relay = CaptchaRelay::new(upstream_client.clone(), &config.upstream.base_url)?;
        let fetcher = ResultFetcher::new(upstream_client, &config.upstream.base_url)?;

        // Collaborators get their own client: the upstream UA and timeout are
        // tuned for the board site, not for Telegram or the model API.
        let service_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        let notifier = config.telegram.as_ref().map(|telegram| {
            Arc::new(TelegramNotifier::new(service_client.clone(), telegram)) as Arc<dyn Notifier>
        });
        let advisor = config
            .ai
            .as_ref()
            .map(|ai| Arc::new(ChatAdvisor::new(service_client.clone(), ai)) as Arc<dyn Advisor>);

        Ok(Self {
            config,
            relay,
            fetcher,
            sessions: Arc::new(MemorySessionStore::new()),
            stats: Arc::new(LookupStats::default()),
            notifier,
            advisor,
        })
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SharedSessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<LookupStats> {
    fn from_ref(state: &AppState) -> Self {
        state.stats.clone()
    }
}
