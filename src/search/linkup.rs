use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search query must not be empty")]
    EmptyQuery,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Linkup API error ({status}): {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    q: &'a str,
    depth: &'a str,
    output_type: &'a str,
    include_images: bool,
}

#[derive(Debug, Clone)]
pub struct LinkupClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl LinkupClient {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: SEARCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Asks for a single sourced answer and returns the raw response body.
    ///
    /// The body is left unparsed: the provider may send an object or a JSON
    /// string wrapping one, and callers normalize either shape.
    pub async fn search(&self, query: &str) -> Result<String, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let request = SearchRequest {
            q: query,
            depth: "standard",
            output_type: "sourcedAnswer",
            include_images: false,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mockito::Matcher;
    use std::net::SocketAddr;

    /// Accepts connections and never answers them.
    pub(crate) async fn silent_listener() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }

    #[tokio::test]
    async fn sends_sourced_answer_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/search")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::Json(serde_json::json!({
                "q": "remote work tips",
                "depth": "standard",
                "outputType": "sourcedAnswer",
                "includeImages": false,
            })))
            .with_status(200)
            .with_body(r#"{"answer":"Take breaks.","sources":[]}"#)
            .create_async()
            .await;

        let client = LinkupClient::new("secret", &server.url());
        let body = client.search("remote work tips").await.unwrap();
        assert!(body.contains("Take breaks."));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/search")
            .with_status(401)
            .with_body("invalid key")
            .create_async()
            .await;

        let client = LinkupClient::new("wrong", &server.url());
        match client.search("anything").await {
            Err(SearchError::Api { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid key");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn silent_provider_times_out() {
        let addr = silent_listener().await;
        let client = LinkupClient::new("secret", &format!("http://{}", addr))
            .with_timeout(Duration::from_millis(200));

        match client.search("anything").await {
            Err(SearchError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn blank_query_is_rejected_without_a_request() {
        let client = LinkupClient::new("secret", "http://127.0.0.1:9");
        assert!(matches!(client.search("  ").await, Err(SearchError::EmptyQuery)));
    }
}
