//! Text generation capability: `generate(prompt) -> text`.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Generation provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Generation response is malformed: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicGenerator;

#[cfg(feature = "anthropic")]
mod anthropic {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
    const API_VERSION: &str = "2023-06-01";
    const MAX_TOKENS: u32 = 1024;

    #[derive(Clone)]
    pub struct AnthropicGenerator {
        api_key: String,
        model: String,
        base_url: String,
        client: reqwest::Client,
    }

    #[derive(Debug, Serialize)]
    struct MessagesRequest<'a> {
        model: &'a str,
        max_tokens: u32,
        messages: Vec<MessageParam<'a>>,
    }

    #[derive(Debug, Serialize)]
    struct MessageParam<'a> {
        role: &'static str,
        content: &'a str,
    }

    #[derive(Debug, Deserialize)]
    struct MessagesResponse {
        content: Vec<ContentBlockResponse>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum ContentBlockResponse {
        Text {
            text: String,
        },
        #[serde(other)]
        Other,
    }

    impl AnthropicGenerator {
        pub fn new(api_key: String, model: String) -> Result<Self, GenerationError> {
            Self::with_base_url(api_key, model, ANTHROPIC_API_BASE.to_string())
        }

        pub fn with_base_url(
            api_key: String,
            model: String,
            base_url: String,
        ) -> Result<Self, GenerationError> {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .map_err(|e| GenerationError::Client(e.to_string()))?;
            Ok(Self {
                api_key,
                model,
                base_url: base_url.trim_end_matches('/').to_string(),
                client,
            })
        }

        fn messages_url(&self) -> String {
            format!("{}/messages", self.base_url)
        }
    }

    #[async_trait]
    impl TextGenerator for AnthropicGenerator {
        #[tracing::instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            let body = MessagesRequest {
                model: &self.model,
                max_tokens: MAX_TOKENS,
                messages: vec![MessageParam {
                    role: "user",
                    content: prompt,
                }],
            };

            let response = self
                .client
                .post(self.messages_url())
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| GenerationError::Request(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(GenerationError::Provider { status, body });
            }

            let parsed: MessagesResponse = response
                .json()
                .await
                .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

            let text: String = parsed
                .content
                .into_iter()
                .filter_map(|b| match b {
                    ContentBlockResponse::Text { text } => Some(text),
                    ContentBlockResponse::Other => None,
                })
                .collect::<Vec<_>>()
                .join("");

            if text.is_empty() {
                return Err(GenerationError::MalformedResponse(
                    "response contains no text".to_string(),
                ));
            }
            Ok(text)
        }

        fn model_name(&self) -> &str {
            &self.model
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn parses_text_blocks_and_skips_others() {
            let raw = r#"{"content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"Hello"}]}"#;
            let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
            let texts: Vec<_> = parsed
                .content
                .into_iter()
                .filter_map(|b| match b {
                    ContentBlockResponse::Text { text } => Some(text),
                    ContentBlockResponse::Other => None,
                })
                .collect();
            assert_eq!(texts, vec!["Hello".to_string()]);
        }

        #[test]
        fn request_body_shape() {
            let body = MessagesRequest {
                model: "claude-3-5-haiku-latest",
                max_tokens: MAX_TOKENS,
                messages: vec![MessageParam {
                    role: "user",
                    content: "hi",
                }],
            };
            let json = serde_json::to_value(&body).unwrap();
            assert_eq!(json["messages"][0]["role"], "user");
            assert_eq!(json["messages"][0]["content"], "hi");
            assert_eq!(json["max_tokens"], 1024);
        }

        #[test]
        fn base_url_trailing_slash_is_trimmed() {
            let generator = AnthropicGenerator::with_base_url(
                "key".to_string(),
                "model".to_string(),
                "http://localhost:9999/v1/".to_string(),
            )
            .unwrap();
            assert_eq!(generator.messages_url(), "http://localhost:9999/v1/messages");
            assert_eq!(generator.model_name(), "model");
        }
    }
}
