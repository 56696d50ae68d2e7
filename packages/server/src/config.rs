use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Required by the server; the CLI can run without it (`--memory`)
    pub database_url: Option<String>,
    pub port: u16,
    /// Missing key is not fatal: matching calls fail one by one instead
    pub openai_api_key: Option<String>,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty()),
            pipeline: PipelineConfig::from_env()?,
        })
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow!("DATABASE_URL must be set"))
    }
}

/// What a repeated match run does with the batch's existing redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RematchMode {
    /// Keep existing rows and add new ones (duplicates accumulate)
    #[default]
    Append,
    /// Delete the batch's redirects before matching
    Replace,
}

impl FromStr for RematchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            other => Err(anyhow!("unknown rematch mode: {}", other)),
        }
    }
}

/// Tunables for the scrape and match stages.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub openai_model: String,
    pub max_completion_tokens: u32,
    pub temperature: f32,
    /// Characters of page text included per URL in the matching prompt
    pub prompt_content_chars: usize,
    pub scrape_concurrency: usize,
    pub scrape_delay: Duration,
    pub scrape_timeout: Duration,
    pub rematch_mode: RematchMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            openai_model: openai_client::DEFAULT_MODEL.to_string(),
            max_completion_tokens: 256,
            temperature: 0.2,
            prompt_content_chars: 2000,
            scrape_concurrency: 1,
            scrape_delay: Duration::ZERO,
            scrape_timeout: Duration::from_secs(30),
            rematch_mode: RematchMode::Append,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            openai_model: env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            max_completion_tokens: defaults.max_completion_tokens,
            temperature: defaults.temperature,
            prompt_content_chars: parse_var("PROMPT_CONTENT_CHARS")?
                .unwrap_or(defaults.prompt_content_chars),
            scrape_concurrency: parse_var::<usize>("SCRAPE_CONCURRENCY")?
                .unwrap_or(defaults.scrape_concurrency)
                .max(1),
            scrape_delay: parse_var("SCRAPE_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.scrape_delay),
            scrape_timeout: parse_var("SCRAPE_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.scrape_timeout),
            rematch_mode: parse_var("REMATCH_MODE")?.unwrap_or(defaults.rematch_mode),
        })
    }
}

/// Unset or empty means "use the default"; anything else must parse.
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow!("{} is invalid: {}", name, e)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::default();

        assert_eq!(config.openai_model, "gpt-4");
        assert_eq!(config.max_completion_tokens, 256);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.scrape_concurrency, 1);
        assert_eq!(config.scrape_timeout, Duration::from_secs(30));
        assert_eq!(config.rematch_mode, RematchMode::Append);
    }

    #[test]
    fn test_rematch_mode_parsing() {
        assert_eq!("append".parse::<RematchMode>().unwrap(), RematchMode::Append);
        assert_eq!(" Replace ".parse::<RematchMode>().unwrap(), RematchMode::Replace);
        assert!("merge".parse::<RematchMode>().is_err());
    }
}
