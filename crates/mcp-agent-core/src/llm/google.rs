//! Google (Gemini) provider implementation

use super::converters::to_google_request;
use super::messages::{LlmRequest, LlmResponse};
use super::parser::parse_google;
use super::provider::LlmProvider;
use crate::config::mask_api_key;
use crate::error::{AgentError, AgentResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Public Gemini API endpoint
pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const PROVIDER: &str = "google";

/// Google (Gemini) provider
pub struct GoogleProvider {
    api_key: String,
    base_url: String,
    http_client: Client,
}

impl GoogleProvider {
    /// Create a provider for the public endpoint
    pub fn new(api_key: impl Into<String>) -> AgentResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| {
                AgentError::llm_with_provider(format!("Failed to create HTTP client: {}", e), PROVIDER)
            })?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
            http_client,
        })
    }

    /// Point the provider at another endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

impl std::fmt::Debug for GoogleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleProvider")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(skip(self, request), fields(model = %request.model), level = "debug")]
    async fn generate(&self, request: &LlmRequest) -> AgentResult<LlmResponse> {
        let body = to_google_request(request)?;
        debug!(
            contents = request.contents.len(),
            tools = request.tools.len(),
            "Sending Gemini request"
        );

        let response = self
            .http_client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AgentError::llm_with_provider(format!("Google request failed: {}", e), PROVIDER)
                    .with_context(format!("model {}", request.model))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::llm_with_provider(
                format!("Google API error (status {}): {}", status, error_text),
                PROVIDER,
            ));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            AgentError::llm_with_provider(format!("Failed to parse Google response: {}", e), PROVIDER)
        })?;

        debug!("Google API response: {}", response_json);

        Ok(parse_google(&response_json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::content::Content;
    use crate::llm::messages::GenerationConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one HTTP response and hand back the raw request text
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if raw.len() >= header_end + 4 + length || n == 0 {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&raw).to_string());
        });

        (format!("http://{}", addr), rx)
    }

    fn request() -> LlmRequest {
        LlmRequest {
            model: "gemini-2.0-flash".to_string(),
            system_instruction: None,
            contents: vec![Content::user_text("whats Miraidon?")],
            tools: Vec::new(),
            generation: GenerationConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_generate_sends_key_header() {
        let (base_url, seen) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"A legendary Pokemon."}]},"finishReason":"STOP"}]}"#,
        )
        .await;

        let provider = GoogleProvider::new("test-key-123").unwrap().with_base_url(base_url);
        let response = provider.generate(&request()).await.unwrap();

        assert_eq!(response.content.unwrap().text(), "A legendary Pokemon.");

        let raw = seen.await.unwrap();
        assert!(raw.starts_with("POST /v1beta/models/gemini-2.0-flash:generateContent "));
        assert!(raw.to_ascii_lowercase().contains("x-goog-api-key: test-key-123"));
        assert!(!raw.contains("key=test-key-123"));
        assert!(raw.contains("whats Miraidon?"));
    }

    #[tokio::test]
    async fn test_http_error_is_llm_error() {
        let (base_url, _seen) = serve_once(
            "400 Bad Request",
            r#"{"error":{"code":400,"message":"API key not valid."}}"#,
        )
        .await;

        let provider = GoogleProvider::new("bad").unwrap().with_base_url(base_url);
        let err = provider.generate(&request()).await.unwrap_err();

        match err {
            AgentError::Llm { message, provider, .. } => {
                assert!(message.contains("400"));
                assert!(message.contains("API key not valid."));
                assert_eq!(provider.as_deref(), Some("google"));
            }
            other => panic!("expected LLM error, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_masks_key() {
        let provider = GoogleProvider::new("AIzaSyExampleExampleExample1234").unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("AIzaSyExampleExampleExample1234"));
    }
}
