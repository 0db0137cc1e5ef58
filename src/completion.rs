//! Completion-service boundary: renders a prompt template, sends it to an
//! OpenAI-compatible chat endpoint and returns the model text. The
//! streaming variant delivers tokens through a callback as they arrive but
//! still returns the final assembled text - extraction always runs on the
//! whole response, never on partial chunks.

use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;
use crate::error::{Error, Result};
use crate::prompts::PromptTemplate;

/// Receives streamed tokens for progressive display. Transport concern
/// only; callers still get the assembled text back.
pub type TokenSink<'a> = &'a (dyn Fn(&str) + Send + Sync);

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Renders the template with the given variables and returns the
    /// complete model response text.
    async fn complete(&self, template: PromptTemplate, vars: &[(&str, String)])
        -> Result<String>;

    /// Same contract as [`complete`](Self::complete), served as an
    /// incremental token stream. Returns the final assembled text.
    async fn complete_stream(
        &self,
        template: PromptTemplate,
        vars: &[(&str, String)],
        on_token: TokenSink<'_>,
    ) -> Result<String>;
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// OpenAI-compatible chat client.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    client: Client,
    config: CompletionConfig,
}

impl OpenAiCompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        OpenAiCompletionClient { client, config }
    }

    fn request_body(&self, template: PromptTemplate, vars: &[(&str, String)], stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: template.render(vars),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream,
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Completion API error {}: {}", status, error_text);
            return Err(Error::Upstream(format!(
                "Completion API error {}: {}",
                status, error_text
            )));
        }
        Ok(response)
    }

    /// One SSE line -> token content, if the line carries any.
    fn parse_sse_line(line: &str) -> Option<String> {
        let data = line.strip_prefix("data:")?.trim();
        if data == "[DONE]" {
            return Some("[DONE]".to_string());
        }
        let chunk: serde_json::Value = serde_json::from_str(data).ok()?;
        chunk
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("delta"))
            .and_then(|delta| delta.get("content"))
            .and_then(|content| content.as_str())
            .map(|s| s.to_string())
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionClient {
    async fn complete(
        &self,
        template: PromptTemplate,
        vars: &[(&str, String)],
    ) -> Result<String> {
        let request = self.request_body(template, vars, false);
        info!(
            "Sending completion request, model: {}, prompt: {:?}",
            self.config.model, template
        );

        let response = self.send(&request).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Malformed completion response: {}", e)))?;

        match parsed.choices.into_iter().next() {
            Some(choice) => Ok(choice.message.content),
            None => Err(Error::Upstream(
                "No response choices from completion service".to_string(),
            )),
        }
    }

    async fn complete_stream(
        &self,
        template: PromptTemplate,
        vars: &[(&str, String)],
        on_token: TokenSink<'_>,
    ) -> Result<String> {
        let request = self.request_body(template, vars, true);
        info!(
            "Sending streaming completion request, model: {}, prompt: {:?}",
            self.config.model, template
        );

        let response = self.send(&request).await?;
        let mut stream = response.bytes_stream();
        let mut full_response = String::new();
        let mut buffer = String::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| Error::Upstream(format!("SSE stream error: {}", e)))?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            while let Some(newline_pos) = buffer.find('\n') {
                let line = buffer[..newline_pos].trim().to_string();
                buffer.drain(..newline_pos + 1);

                if let Some(content) = Self::parse_sse_line(&line) {
                    if content == "[DONE]" {
                        debug!("SSE stream completed, {} chars total", full_response.len());
                        return Ok(full_response);
                    }
                    if !content.is_empty() {
                        on_token(&content);
                        full_response.push_str(&content);
                    }
                }
            }
        }

        // Stream closed without a [DONE] marker; whatever arrived is the
        // final text.
        if !buffer.trim().is_empty() {
            if let Some(content) = Self::parse_sse_line(buffer.trim()) {
                if content != "[DONE]" && !content.is_empty() {
                    on_token(&content);
                    full_response.push_str(&content);
                }
            }
        }

        info!("Streaming completed, {} chars total", full_response.len());
        Ok(full_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_line_extracts_delta_content() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(
            OpenAiCompletionClient::parse_sse_line(line),
            Some("Hel".to_string())
        );
    }

    #[test]
    fn sse_done_marker_is_recognized() {
        assert_eq!(
            OpenAiCompletionClient::parse_sse_line("data: [DONE]"),
            Some("[DONE]".to_string())
        );
    }

    #[test]
    fn non_data_lines_are_ignored() {
        assert_eq!(OpenAiCompletionClient::parse_sse_line(""), None);
        assert_eq!(OpenAiCompletionClient::parse_sse_line(": keepalive"), None);
        assert_eq!(
            OpenAiCompletionClient::parse_sse_line("event: message"),
            None
        );
    }

    #[test]
    fn delta_without_content_is_ignored() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(OpenAiCompletionClient::parse_sse_line(line), None);
    }
}
