//! OpenAI-compatible implementation of the [`CompletionClient`] collaborator.
//!
//! Sends a single user message to a chat-completions endpoint and returns
//! the raw text of the first choice. One attempt per call; transport
//! failures, non-success statuses and empty responses surface as
//! [`CompletionError`] — retrying is the caller's decision, and no caller
//! in this crate retries.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::config::AppConfig;
use crate::contract::{CompletionClient, CompletionError};

/// Sampling temperature: extraction should be boring and reproducible.
const TEMPERATURE: f64 = 0.2;

pub struct OpenAiClient {
    http: reqwest::Client,
    config: AppConfig,
}

impl OpenAiClient {
    pub fn new(config: AppConfig) -> Self {
        OpenAiClient {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete<'a>(
        &self,
        prompt: &str,
        response_format_hint: Option<&'a str>,
    ) -> Result<String, CompletionError> {
        let mut full_prompt = prompt.trim().to_string();
        match response_format_hint {
            Some(schema) => full_prompt.push_str(&format!(
                "\n\nThe output MUST match this JSON schema:\n{schema}\nRespond ONLY with valid JSON. Do not include markdown or explanations."
            )),
            None => full_prompt.push_str(
                "\n\nRespond ONLY with valid JSON. Do not include markdown or explanations.",
            ),
        }

        let url = format!("{}/chat/completions", self.config.openai_base_url);
        let body = json!({
            "model": self.config.openai_model,
            "temperature": TEMPERATURE,
            "messages": [{"role": "user", "content": full_prompt}],
        });

        debug!(model = %self.config.openai_model, prompt_len = full_prompt.len(), "sending completion request");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.openai_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "completion service returned an error");
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(CompletionError::Empty)
    }
}
