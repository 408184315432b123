pub mod fallback;
pub mod researcher;
pub mod writer;

use anyhow::Result;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use crate::config::Config;
use crate::instrumentation::{PostSource, RunLog, RunLogger};
use crate::llm::{select_model, OllamaClient};
use crate::search::LinkupClient;

pub use fallback::fallback;
use researcher::{ResearchResult, Researcher};
use writer::{GenerationError, Writer};

/// Phrase every post must end on; matched without its punctuation.
pub const CLOSING_PHRASE: &str = "Keep being awesome at what you do";
pub const CLOSING_LINE: &str = "Keep being awesome at what you do!";

#[derive(Debug, Clone)]
pub struct Post {
    pub text: String,
    pub source: PostSource,
    pub run_log: RunLog,
}

struct Attempt {
    research: ResearchResult,
    research_latency_ms: u64,
    generation_latency_ms: u64,
    result: Result<String, GenerationError>,
}

pub struct BlogAgent {
    researcher: Researcher,
    writer: Writer,
    logger: Option<RunLogger>,
}

impl BlogAgent {
    /// Probes the generation host once and settles on the effective model.
    pub async fn new(config: &Config) -> Result<Self> {
        let llm = OllamaClient::new(&config.llm_base_url)?;
        let available = llm.list_models().await;
        Self::with_models(config, llm, &available)
    }

    /// Builds the agent from an already known list of installed models.
    pub fn with_models(config: &Config, llm: OllamaClient, available: &[String]) -> Result<Self> {
        let model = select_model(&config.llm_model, available);
        let logger = config
            .run_log_dir
            .as_deref()
            .map(RunLogger::new)
            .transpose()?;

        tracing::info!(model = %model, host = llm.base_url(), "blog agent initialized");

        Ok(Self {
            researcher: Researcher::new(
                LinkupClient::new(&config.linkup_api_key, &config.linkup_base_url)
                    .with_timeout(config.search_timeout),
            ),
            writer: Writer::new(llm, model, config.generation_timeout),
            logger,
        })
    }

    pub fn model(&self) -> &str {
        self.writer.model()
    }

    pub async fn research(&self, topic: &str) -> ResearchResult {
        self.researcher.research(topic).await
    }

    /// Runs research and generation, falling back to canned content on any failure.
    pub async fn compose(&self, topic: &str) -> Post {
        let started = Instant::now();
        tracing::info!(topic, "creating blog post");

        let attempt = match AssertUnwindSafe(self.attempt(topic)).catch_unwind().await {
            Ok(attempt) => attempt,
            Err(_) => {
                tracing::error!(topic, "blog pipeline panicked");
                Attempt {
                    research: ResearchResult {
                        summary: String::new(),
                    },
                    research_latency_ms: 0,
                    generation_latency_ms: 0,
                    result: Err(GenerationError::Panicked),
                }
            }
        };

        let (text, source) = match attempt.result {
            Ok(text) => (text, PostSource::Generated),
            Err(e) => {
                tracing::warn!(topic, error = %e, "using fallback content");
                (
                    fallback(topic),
                    PostSource::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        };

        let run_log = RunLog {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            topic: topic.to_string(),
            model: self.model().to_string(),
            summary: attempt.research.summary,
            research_latency_ms: attempt.research_latency_ms,
            generation_latency_ms: attempt.generation_latency_ms,
            total_latency_ms: started.elapsed().as_millis() as u64,
            source: source.clone(),
            characters: text.chars().count(),
        };

        if let Some(logger) = &self.logger {
            if let Err(e) = logger.write(&run_log) {
                tracing::warn!(error = %e, "could not write run log");
            }
        }
        tracing::info!(summary = %run_log.summary(), "blog post ready");

        Post {
            text,
            source,
            run_log,
        }
    }

    pub async fn create_post(&self, topic: &str) -> String {
        self.compose(topic).await.text
    }

    async fn attempt(&self, topic: &str) -> Attempt {
        let research_start = Instant::now();
        let research = self.researcher.research(topic).await;
        let research_latency_ms = research_start.elapsed().as_millis() as u64;

        let generation_start = Instant::now();
        let result = self.writer.generate(topic, &research).await;
        let generation_latency_ms = generation_start.elapsed().as_millis() as u64;

        Attempt {
            research,
            research_latency_ms,
            generation_latency_ms,
            result,
        }
    }
}
