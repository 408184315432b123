use chrono::{DateTime, Local};
use uuid::Uuid;

const MAX_FILENAME_CHARS: usize = 30;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub topic: String,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl HistoryEntry {
    /// Name offered when the post is downloaded as plain text.
    pub fn filename(&self) -> String {
        let stem: String = self
            .topic
            .to_lowercase()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .take(MAX_FILENAME_CHARS)
            .collect();

        if stem.is_empty() {
            "blog_post.txt".to_string()
        } else {
            format!("{}.txt", stem)
        }
    }
}

/// Posts generated during one interactive session, oldest first.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, topic: &str, content: String) -> &HistoryEntry {
        self.entries.push(HistoryEntry {
            id: Uuid::new_v4(),
            topic: topic.to_string(),
            content,
            timestamp: Local::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
