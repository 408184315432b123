use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LINKUP_BASE_URL: &str = "https://api.linkup.so/v1";
pub const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_LLM_MODEL: &str = "llama3:latest";
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:8501";

#[derive(Debug, Clone)]
pub struct Config {
    pub linkup_api_key: String,
    pub linkup_base_url: String,
    pub search_timeout: Duration,
    pub llm_base_url: String,
    pub llm_model: String,
    pub generation_timeout: Duration,
    pub run_log_dir: Option<PathBuf>,
    pub server_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            linkup_api_key: std::env::var("LINKUP_API_KEY")
                .context("LINKUP_API_KEY must be set")?,
            linkup_base_url: std::env::var("LINKUP_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LINKUP_BASE_URL.into()),
            search_timeout: Duration::from_secs(
                std::env::var("LINKUP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".into())
                    .parse()
                    .context("LINKUP_TIMEOUT_SECS must be a number")?,
            ),
            llm_base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.into()),
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.into()),
            generation_timeout: Duration::from_secs(
                std::env::var("LLM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "90".into())
                    .parse()
                    .context("LLM_TIMEOUT_SECS must be a number")?,
            ),
            run_log_dir: std::env::var("RUN_LOG_DIR").ok().map(PathBuf::from),
            server_addr: std::env::var("BLOG_SERVER_ADDR")
                .unwrap_or_else(|_| DEFAULT_SERVER_ADDR.into()),
        })
    }

    #[cfg(test)]
    pub fn new(linkup_api_key: &str) -> Self {
        Self {
            linkup_api_key: linkup_api_key.to_string(),
            linkup_base_url: DEFAULT_LINKUP_BASE_URL.into(),
            search_timeout: Duration::from_secs(30),
            llm_base_url: DEFAULT_LLM_BASE_URL.into(),
            llm_model: DEFAULT_LLM_MODEL.into(),
            generation_timeout: Duration::from_secs(90),
            run_log_dir: None,
            server_addr: DEFAULT_SERVER_ADDR.into(),
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.llm_model = model;
        }
        self
    }

    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        if let Some(secs) = secs {
            self.generation_timeout = Duration::from_secs(secs);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_ollama() {
        let config = Config::new("key");
        assert_eq!(config.llm_base_url, "http://localhost:11434");
        assert_eq!(config.llm_model, "llama3:latest");
        assert_eq!(config.generation_timeout, Duration::from_secs(90));
        assert_eq!(config.search_timeout, Duration::from_secs(30));
        assert!(config.run_log_dir.is_none());
    }

    #[test]
    fn cli_overrides_replace_only_given_values() {
        let config = Config::new("key")
            .with_model(Some("mistral:7b".into()))
            .with_timeout(None);
        assert_eq!(config.llm_model, "mistral:7b");
        assert_eq!(config.generation_timeout, Duration::from_secs(90));

        let config = config.with_model(None).with_timeout(Some(5));
        assert_eq!(config.llm_model, "mistral:7b");
        assert_eq!(config.generation_timeout, Duration::from_secs(5));
    }
}
