use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// How the text of a post was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostSource {
    Generated,
    Fallback { reason: String },
}

impl PostSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PostSource::Fallback { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    pub id: String,
    pub timestamp: String,
    pub topic: String,
    pub model: String,
    pub summary: String,
    pub research_latency_ms: u64,
    pub generation_latency_ms: u64,
    pub total_latency_ms: u64,
    pub source: PostSource,
    pub characters: usize,
}

impl RunLog {
    pub fn summary(&self) -> String {
        let source = match &self.source {
            PostSource::Generated => format!("generated by {}", self.model),
            PostSource::Fallback { reason } => format!("fallback ({})", reason),
        };
        format!(
            "Source: {} | Research: {:.1}s | Generation: {:.1}s | Total: {:.1}s | Characters: {}",
            source,
            self.research_latency_ms as f64 / 1000.0,
            self.generation_latency_ms as f64 / 1000.0,
            self.total_latency_ms as f64 / 1000.0,
            self.characters,
        )
    }
}

pub struct RunLogger {
    dir: PathBuf,
}

impl RunLogger {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).context("Failed to create logs directory")?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn write(&self, run_log: &RunLog) -> Result<()> {
        let path = self.dir.join("runs.jsonl");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open log file")?;

        let json = serde_json::to_string(run_log).context("Failed to serialize run log")?;
        writeln!(file, "{}", json).context("Failed to write log")?;

        Ok(())
    }
}
