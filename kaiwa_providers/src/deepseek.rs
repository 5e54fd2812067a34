use async_trait::async_trait;
use kaiwa_core::{CompletionOptions, CompletionProvider, CompletionReply, ProviderError, Turn};
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the DeepSeek chat-completions API.
///
/// The endpoint is OpenAI-compatible, so `with_base_url` also points this
/// at any other provider speaking the same protocol (or a mock server in
/// tests). Only the first choice of a response is ever used.
pub struct DeepSeekProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl DeepSeekProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating DeepSeekProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn normalize_send_error(&self, err: &reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Transport(err.to_string())
        }
    }

    fn normalize_status(status: StatusCode, body: String) -> ProviderError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(body),
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(body),
            s if s.is_client_error() => ProviderError::InvalidRequest(format!("{s}: {body}")),
            s => ProviderError::Transport(format!("{s}: {body}")),
        }
    }
}

#[async_trait]
impl CompletionProvider for DeepSeekProvider {
    async fn complete(
        &self,
        turns: &[Turn],
        options: &CompletionOptions,
    ) -> Result<CompletionReply, ProviderError> {
        let request = json!({
            "model": options.model,
            "messages": turns,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });

        debug!(
            "Sending completion request: model={}, turns={}",
            options.model,
            turns.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.normalize_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::normalize_status(status, body));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ProviderError::Transport(format!("invalid response body: {e}")))?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(ProviderError::EmptyReply)?
            .to_string();

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyReply);
        }

        let usage = body["usage"].as_object().map(|u| kaiwa_core::Usage {
            prompt_tokens: u32::try_from(u["prompt_tokens"].as_u64().unwrap_or(0)).unwrap_or(0),
            completion_tokens: u32::try_from(u["completion_tokens"].as_u64().unwrap_or(0))
                .unwrap_or(0),
            total_tokens: u32::try_from(u["total_tokens"].as_u64().unwrap_or(0)).unwrap_or(0),
        });

        debug!("Received completion: {} chars", content.len());
        Ok(CompletionReply { content, usage })
    }

    fn default_model(&self) -> &'static str {
        "deepseek-chat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> DeepSeekProvider {
        DeepSeekProvider::new("test-key".to_string()).with_base_url(server.uri())
    }

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}
        })
    }

    #[tokio::test]
    async fn completes_and_parses_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("喵~ 你好")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let reply = provider
            .complete(&[Turn::user("你好")], &CompletionOptions::default())
            .await;

        let reply = match reply {
            Ok(r) => r,
            Err(e) => panic!("request failed: {e}"),
        };
        assert_eq!(reply.content, "喵~ 你好");
        assert_eq!(reply.usage.map(|u| u.total_tokens), Some(19));
    }

    #[tokio::test]
    async fn sends_model_temperature_and_role_tags() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "deepseek-chat",
                "temperature": 1.3,
                "max_tokens": 1000,
                "messages": [
                    {"role": "system", "content": "prompt"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let turns = [Turn::system("prompt"), Turn::user("hi")];
        let result = provider.complete(&turns, &CompletionOptions::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn rejected_credential_maps_to_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider
            .complete(&[Turn::user("hi")], &CompletionOptions::default())
            .await;

        assert!(matches!(result, Err(ProviderError::Auth(msg)) if msg.contains("invalid api key")));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider
            .complete(&[Turn::user("hi")], &CompletionOptions::default())
            .await;

        assert!(matches!(result, Err(ProviderError::RateLimited(_))));
    }

    #[tokio::test]
    async fn other_client_error_maps_to_invalid_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad payload"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider
            .complete(&[Turn::user("hi")], &CompletionOptions::default())
            .await;

        assert!(matches!(result, Err(ProviderError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn blank_content_maps_to_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("   ")))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider
            .complete(&[Turn::user("hi")], &CompletionOptions::default())
            .await;

        assert!(matches!(result, Err(ProviderError::EmptyReply)));
    }

    #[tokio::test]
    async fn missing_choices_maps_to_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider
            .complete(&[Turn::user("hi")], &CompletionOptions::default())
            .await;

        assert!(matches!(result, Err(ProviderError::EmptyReply)));
    }
}
