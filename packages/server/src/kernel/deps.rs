//! Server dependencies (using traits for testability)
//!
//! Central dependency container handed to every domain activity. All external
//! services sit behind trait objects so tests can swap in mocks.

use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;

use super::{
    CompletionProvider, HttpPageFetcher, OpenAICompletionProvider, PageFetcher, PgUrlRepository,
    UrlRepository,
};
use crate::config::Config;

#[derive(Clone)]
pub struct ServerDeps {
    pub repo: Arc<dyn UrlRepository>,
    pub ai: Arc<dyn CompletionProvider>,
    pub fetcher: Arc<dyn PageFetcher>,
}

impl ServerDeps {
    pub fn new(
        repo: Arc<dyn UrlRepository>,
        ai: Arc<dyn CompletionProvider>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self { repo, ai, fetcher }
    }

    /// Production wiring around an existing Postgres pool
    pub fn production(pool: PgPool, config: &Config) -> Result<Self> {
        Self::with_repository(Arc::new(PgUrlRepository::new(pool)), config)
    }

    /// Real OpenAI and HTTP clients around the given store
    pub fn with_repository(repo: Arc<dyn UrlRepository>, config: &Config) -> Result<Self> {
        let ai = OpenAICompletionProvider::from_api_key(
            config.openai_api_key.as_deref(),
            &config.pipeline,
        );
        let fetcher = HttpPageFetcher::new(config.pipeline.scrape_timeout)?;

        Ok(Self::new(repo, Arc::new(ai), Arc::new(fetcher)))
    }
}
