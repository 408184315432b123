use serde_json::Value;

use crate::search::LinkupClient;

const MAX_SUMMARY_CHARS: usize = 200;
const MAX_SENTENCES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchResult {
    pub summary: String,
}

pub struct Researcher {
    search: LinkupClient,
}

impl Researcher {
    pub fn new(search: LinkupClient) -> Self {
        Self { search }
    }

    /// Never fails: search errors degrade to a generic "Key trends in ..." summary.
    pub async fn research(&self, query: &str) -> ResearchResult {
        tracing::info!(query, "researching");

        match self.search.search(query).await {
            Ok(payload) => {
                tracing::info!("research complete");
                ResearchResult {
                    summary: summarize(&payload),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "research failed");
                ResearchResult {
                    summary: format!("Key trends in {}", query),
                }
            }
        }
    }
}

/// Reduces a search payload to a short summary of its `answer` field.
///
/// Accepts a JSON object or a JSON string wrapping one. Text that is not
/// JSON at all is kept raw, cut to 200 characters.
pub fn summarize(payload: &str) -> String {
    let value = match serde_json::from_str::<Value>(payload) {
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(&inner) {
            Ok(value) => value,
            Err(_) => return take_chars(&inner, MAX_SUMMARY_CHARS),
        },
        Ok(value) => value,
        Err(_) => return take_chars(payload, MAX_SUMMARY_CHARS),
    };

    value
        .get("answer")
        .and_then(Value::as_str)
        .map(shorten_answer)
        .unwrap_or_default()
}

fn shorten_answer(answer: &str) -> String {
    let short = answer
        .split(". ")
        .take(MAX_SENTENCES)
        .collect::<Vec<_>>()
        .join(". ");

    if short.chars().count() > MAX_SUMMARY_CHARS {
        format!("{}...", take_chars(&short, MAX_SUMMARY_CHARS - 3))
    } else {
        short
    }
}

fn take_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_two_sentences() {
        let payload = r#"{"answer":"Async is common. Teams meet less. Tools matter most.","sources":[]}"#;
        assert_eq!(summarize(payload), "Async is common. Teams meet less");
    }

    #[test]
    fn long_answer_is_cut_with_ellipsis() {
        let first = "a".repeat(150);
        let second = "b".repeat(150);
        let payload = serde_json::json!({ "answer": format!("{}. {}. third", first, second) }).to_string();

        let summary = summarize(&payload);
        assert_eq!(summary.chars().count(), 200);
        assert!(summary.ends_with("..."));
        assert!(summary.starts_with(&first));
    }

    #[test]
    fn answer_of_exactly_two_hundred_chars_is_untouched() {
        let answer = "x".repeat(200);
        let payload = serde_json::json!({ "answer": answer }).to_string();
        assert_eq!(summarize(&payload), answer);
    }

    #[test]
    fn json_string_wrapping_an_object_is_unwrapped() {
        let inner = r#"{"answer":"Wrapped answer. Second. Third."}"#;
        let payload = serde_json::to_string(inner).unwrap();
        assert_eq!(summarize(&payload), "Wrapped answer. Second");
    }

    #[test]
    fn non_json_payload_is_kept_raw_and_cut() {
        let raw = "plain text ".repeat(40);
        let summary = summarize(&raw);
        assert_eq!(summary.chars().count(), 200);
        assert!(raw.starts_with(&summary));
    }

    #[test]
    fn json_string_with_plain_text_is_kept_raw() {
        let payload = serde_json::to_string("just words").unwrap();
        assert_eq!(summarize(&payload), "just words");
    }

    #[test]
    fn missing_answer_gives_empty_summary() {
        assert_eq!(summarize(r#"{"results":[]}"#), "");
        assert_eq!(summarize("[1, 2, 3]"), "");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let answer = "é".repeat(250);
        let payload = serde_json::json!({ "answer": answer }).to_string();
        let summary = summarize(&payload);
        assert_eq!(summary.chars().count(), 200);
        assert!(summary.ends_with("..."));
    }

    #[tokio::test]
    async fn search_failure_degrades_to_key_trends() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/search")
            .with_status(503)
            .create_async()
            .await;

        let researcher = Researcher::new(LinkupClient::new("key", &server.url()));
        let result = researcher.research("remote work tips").await;
        assert_eq!(result.summary, "Key trends in remote work tips");
    }

    #[tokio::test]
    async fn unreachable_provider_degrades_to_key_trends() {
        let researcher = Researcher::new(LinkupClient::new("key", "http://127.0.0.1:9"));
        let result = researcher.research("rust").await;
        assert_eq!(
            result,
            ResearchResult {
                summary: "Key trends in rust".into()
            }
        );
    }

    #[tokio::test]
    async fn provider_timeout_degrades_to_key_trends() {
        let addr = crate::search::linkup::tests::silent_listener().await;
        let search = LinkupClient::new("key", &format!("http://{}", addr))
            .with_timeout(std::time::Duration::from_millis(200));

        let result = Researcher::new(search).research("remote work tips").await;
        assert_eq!(result.summary, "Key trends in remote work tips");
    }

    #[tokio::test]
    async fn successful_search_is_summarized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/search")
            .with_status(200)
            .with_body(r#"{"answer":"Set boundaries. Use a real desk. Log off on time.","sources":[]}"#)
            .create_async()
            .await;

        let researcher = Researcher::new(LinkupClient::new("key", &server.url()));
        let result = researcher.research("remote work tips").await;
        assert_eq!(result.summary, "Set boundaries. Use a real desk");
    }
}
