//! LLM Client: the single point of entry for all chat-completion calls.
//!
//! ARCHITECTURAL RULE: No other module may call the provider API directly.
//! All LLM interactions MUST go through `CompletionProvider`.
//!
//! Model: gpt-3.5-turbo (hardcoded, not configurable)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

pub mod prompts;

/// The model used for all LLM calls.
pub const MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed provider envelope: {0}")]
    Envelope(serde_json::Error),

    #[error("No choices found in LLM response")]
    EmptyChoices,

    #[error("LLM response carried no message content")]
    MissingContent,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LlmError {
    /// True when the upstream call itself failed, as opposed to its content being unusable.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, LlmError::Http(_) | LlmError::Api { .. })
    }
}

/// Anything that can answer a single-prompt chat completion.
///
/// Carried in `AppState` as `Arc<dyn CompletionProvider>`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issues one completion request and returns the raw provider response body.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Chat-completions client over HTTPS with a bearer credential.
/// One request per call; failures are surfaced immediately.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            api_url,
        })
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!("Error during LLM API call: {e}");
                LlmError::Http(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("LLM API returned non-OK status: {status}");
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Raw LLM API response: {body}");
        Ok(body)
    }
}

/// Pulls `choices[0].message.content` out of a provider response body.
pub fn extract_content(body: &str) -> Result<String, LlmError> {
    let envelope: ChatResponse = serde_json::from_str(body).map_err(LlmError::Envelope)?;
    let first = envelope.choices.into_iter().next().ok_or(LlmError::EmptyChoices)?;
    first
        .message
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(LlmError::MissingContent)
}

/// Removes every ```json / ``` code-fence marker and trims surrounding whitespace.
///
/// Idempotent: no run of three backticks survives the second replacement, so a
/// second pass can only trim, which is already done.
pub fn strip_json_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Sends `prompt`, unwraps the provider envelope and decodes the content as a JSON array.
/// The prompt must instruct the model to return a JSON array.
pub async fn call_json_array<T: DeserializeOwned>(
    llm: &dyn CompletionProvider,
    prompt: &str,
) -> Result<Vec<T>, LlmError> {
    let body = llm.complete(prompt).await?;
    let content = extract_content(&body)?;
    let stripped = strip_json_fences(&content);
    Ok(serde_json::from_str(&stripped)?)
}

#[cfg(test)]
pub mod testing {
    //! Scripted provider for driving extractors and handlers without the network.

    use std::sync::Mutex;

    use super::*;

    /// Wraps `content` in a minimal chat-completions envelope.
    pub fn envelope(content: &str) -> String {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "model": MODEL,
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": content },
                    "finish_reason": "stop"
                }
            ]
        })
        .to_string()
    }

    #[derive(Debug, Clone)]
    enum Reply {
        Body(String),
        Fail(u16),
    }

    /// Answers each prompt with the reply of the first rule whose needle the prompt contains.
    #[derive(Default)]
    pub struct ScriptedProvider {
        rules: Vec<(String, Reply)>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Replies with `content` wrapped in a provider envelope.
        pub fn reply(self, needle: &str, content: &str) -> Self {
            self.raw(needle, &envelope(content))
        }

        /// Replies with `body` verbatim.
        pub fn raw(mut self, needle: &str, body: &str) -> Self {
            self.rules
                .push((needle.to_string(), Reply::Body(body.to_string())));
            self
        }

        /// Fails with an API error carrying `status`.
        pub fn fail(mut self, needle: &str, status: u16) -> Self {
            self.rules.push((needle.to_string(), Reply::Fail(status)));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn prompts(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push(prompt.to_string());
            let reply = self
                .rules
                .iter()
                .find(|(needle, _)| prompt.contains(needle.as_str()))
                .map(|(_, reply)| reply.clone());
            match reply {
                Some(Reply::Body(body)) => Ok(body),
                Some(Reply::Fail(status)) => Err(LlmError::Api {
                    status,
                    message: "scripted failure".to_string(),
                }),
                None => Err(LlmError::Api {
                    status: 404,
                    message: format!("no scripted reply for prompt: {prompt}"),
                }),
            }
        }
    }
}
