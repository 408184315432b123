use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};

use super::researcher::ResearchResult;
use super::{CLOSING_LINE, CLOSING_PHRASE};
use crate::llm::{FragmentStream, GenerateRequest, LlmError, OllamaClient};

/// Streamed output shorter than this counts as a failed generation.
pub const MIN_CONTENT_CHARS: usize = 50;
const MAX_CONTENT_BYTES: usize = 64 * 1024;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;
const STOP_SEQUENCE: &str = "# END";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("generation host did not respond within {0:?}")]
    Timeout(Duration),
    #[error("generation produced only {chars} characters")]
    TooShort { chars: usize },
    #[error("blog pipeline panicked")]
    Panicked,
}

pub struct Writer {
    llm: OllamaClient,
    model: String,
    timeout: Duration,
}

impl Writer {
    pub fn new(llm: OllamaClient, model: String, timeout: Duration) -> Self {
        Self {
            llm,
            model,
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(
        &self,
        topic: &str,
        research: &ResearchResult,
    ) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: build_prompt(topic, &research.summary),
            stream: true,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stop_sequences: vec![STOP_SEQUENCE.to_string()],
        };

        tracing::info!(model = %self.model, "sending streaming generation request");
        let started = Instant::now();
        let deadline = started + self.timeout;

        let stream = match timeout_at(deadline, self.llm.generate_stream(&request)).await {
            Ok(stream) => stream?,
            Err(_) => return Err(GenerationError::Timeout(self.timeout)),
        };

        let content = accumulate(stream, deadline).await;
        let chars = content.chars().count();
        tracing::info!(
            chars,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generation finished"
        );

        if chars < MIN_CONTENT_CHARS {
            return Err(GenerationError::TooShort { chars });
        }

        Ok(ensure_closing_line(content))
    }
}

/// Concatenates fragments until the stream ends, fails, hits the deadline, or
/// grows past the size cap. Whatever arrived before an interruption is kept.
async fn accumulate(mut stream: FragmentStream, deadline: Instant) -> String {
    let mut content = String::new();

    loop {
        match timeout_at(deadline, stream.next()).await {
            Ok(Some(Ok(fragment))) => {
                content.push_str(&fragment);
                if content.len() >= MAX_CONTENT_BYTES {
                    tracing::warn!(bytes = content.len(), "generation output hit size cap");
                    break;
                }
            }
            Ok(Some(Err(e))) => {
                tracing::warn!(error = %e, "streaming connection broken");
                break;
            }
            Ok(None) => break,
            Err(_) => {
                tracing::warn!("streaming connection timed out");
                break;
            }
        }
    }

    content
}

fn build_prompt(topic: &str, summary: &str) -> String {
    format!(
        r#"Write a short blog post (600 words max) about {topic}.
Style: casual, first-person, practical advice. Be conversational, no pretentious language.
Key point: {summary}
End with: "{CLOSING_LINE}"
Format: title, intro, 2-3 sections, conclusion."#
    )
}

/// Makes the closing phrase appear exactly once: appended when missing,
/// later repeats removed.
pub fn ensure_closing_line(mut content: String) -> String {
    match content.find(CLOSING_PHRASE) {
        None => {
            content.push_str("\n\n");
            content.push_str(CLOSING_LINE);
            content
        }
        Some(first) => {
            let tail_start = first + CLOSING_PHRASE.len();
            let tail = content[tail_start..]
                .replace(CLOSING_LINE, "")
                .replace(CLOSING_PHRASE, "");
            content.truncate(tail_start);
            content.push_str(&tail);
            content
        }
    }
}
