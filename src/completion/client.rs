//! OpenAI-compatible chat completion client
//!
//! Endpoint: POST {base_url}/chat/completions, non-streaming.
//! Works with the hosted OpenAI API and with any compatible server
//! (a local Ollama exposes one at http://127.0.0.1:11434/v1).

use super::TextCompletion;
use crate::errors::{IncidentError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default completion API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default request timeout (60 seconds)
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat completion client
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionClient {
    /// Create client with default endpoint and model, no credentials
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_BASE_URL, DEFAULT_MODEL, None, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create client with custom configuration
    pub fn with_config(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(IncidentError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    /// Get current model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a bearer token will be sent
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_request(&self, system_prompt: &str, user_prompt: &str, temperature: f32) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature,
            stream: false,
        }
    }
}

#[async_trait]
impl TextCompletion for ChatCompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(system_prompt, user_prompt, temperature);

        debug!(model = %self.model, temperature, "sending chat completion request");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| IncidentError::ServiceError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IncidentError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| IncidentError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        body.into_content()
    }
}

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completion response body (only the fields we read)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| IncidentError::MalformedResponse("response had no message content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ChatCompletionClient::new().unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert!(!client.has_api_key());
    }

    #[test]
    fn test_client_with_config_trims_slash() {
        let client = ChatCompletionClient::with_config(
            "http://127.0.0.1:11434/v1/",
            "llama3.1:8b",
            Some("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:11434/v1");
        assert_eq!(client.model(), "llama3.1:8b");
        assert!(client.has_api_key());
    }

    #[test]
    fn test_request_serialization() {
        let client = ChatCompletionClient::new().unwrap();
        let request = client.build_request("sys", "user", 0.0);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], DEFAULT_MODEL);
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "sys");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["temperature"].as_f64(), Some(0.0));
    }

    #[test]
    fn test_response_content_extracted() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":" YES \n"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.into_content().unwrap(), " YES \n");
    }

    #[test]
    fn test_response_without_choices_is_malformed() {
        let body: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            body.into_content(),
            Err(IncidentError::MalformedResponse(_))
        ));

        let body: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(body.into_content().is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_service_error() {
        let client = ChatCompletionClient::with_config(
            "http://127.0.0.1:9",
            DEFAULT_MODEL,
            None,
            Duration::from_secs(2),
        )
        .unwrap();
        let result = client.complete("sys", "user", 0.0).await;
        match result {
            Err(e) => assert!(e.is_transient()),
            Ok(_) => panic!("nothing should answer on the discard port"),
        }
    }
}
