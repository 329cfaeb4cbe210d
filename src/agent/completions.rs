//! Agent runner backed by an OpenAI-compatible chat-completions API.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::catalog::CourseCatalog;
use super::instruction::{render_instruction, DEFAULT_INSTRUCTION};
use super::AgentRunner;
use crate::error::SupportDeskError;
use crate::session::{SessionKey, SessionStore};
use crate::Result;

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Settings of a [`CompletionsRunner`].
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    /// Bearer token. Omitted from requests when `None`.
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Tool rounds allowed before a turn must produce a reply.
    pub max_tool_rounds: usize,
    /// System instruction template.
    pub instruction: String,
    pub catalog: CourseCatalog,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: 0.2,
            timeout: Duration::from_secs(60),
            max_tool_rounds: 4,
            instruction: DEFAULT_INSTRUCTION.to_string(),
            catalog: CourseCatalog::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ToolCall>,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new("tool", content)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn invocation(message: impl Into<String>) -> SupportDeskError {
    SupportDeskError::AgentInvocation(message.into())
}

/// Customer-service agent speaking the chat-completions protocol.
///
/// Keeps a transcript per session so follow-up questions have context.
/// The transcript belongs to the runner; only tool calls touch the
/// session state.
pub struct CompletionsRunner {
    client: Client,
    config: RunnerConfig,
    transcripts: Mutex<HashMap<SessionKey, Vec<ChatMessage>>>,
}

impl CompletionsRunner {
    /// Create a runner with its own HTTP client.
    pub fn new(config: RunnerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| invocation(format!("cannot create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            transcripts: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Number of messages remembered for a session.
    pub fn transcript_len(&self, key: &SessionKey) -> usize {
        self.transcripts
            .lock()
            .map(|t| t.get(key).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn load_transcript(&self, key: &SessionKey) -> Result<Vec<ChatMessage>> {
        let transcripts = self
            .transcripts
            .lock()
            .map_err(|_| SupportDeskError::LockPoisoned)?;
        Ok(transcripts.get(key).cloned().unwrap_or_default())
    }

    fn save_transcript(&self, key: &SessionKey, transcript: Vec<ChatMessage>) -> Result<()> {
        let mut transcripts = self
            .transcripts
            .lock()
            .map_err(|_| SupportDeskError::LockPoisoned)?;
        transcripts.insert(key.clone(), transcript);
        Ok(())
    }

    /// System message rendered from the current session state.
    fn system_message(&self, store: &SessionStore, key: &SessionKey) -> Result<ChatMessage> {
        let session = store.get(key)?;
        let instruction = render_instruction(&self.config.instruction, &session.state);
        Ok(ChatMessage::new(
            "system",
            format!("{}\n\n{}", instruction, self.config.catalog.describe()),
        ))
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<ChatMessage> {
        let tools = if self.config.catalog.courses().is_empty() {
            None
        } else {
            Some(self.config.catalog.tool_definitions())
        };
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            tools,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        debug!(
            model = %self.config.model,
            url = %url,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            invocation(format!(
                "request failed after {}ms: {}",
                start.elapsed().as_millis(),
                e
            ))
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| invocation(format!("failed to read response: {}", e)))?;
        debug!(
            status = %status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Chat completion finished"
        );

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(invocation(format!("HTTP {}: {}", status, error.error.message)));
            }
            return Err(invocation(format!("HTTP {}: {}", status, body)));
        }

        let response: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| invocation(format!("malformed response: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| invocation("no choices in response"))
    }
}

#[async_trait]
impl AgentRunner for CompletionsRunner {
    async fn send(&self, store: &SessionStore, key: &SessionKey, text: &str) -> Result<String> {
        let mut transcript = self.load_transcript(key)?;
        transcript.push(ChatMessage::new("user", text));

        let mut rounds = 0;
        loop {
            let mut messages = vec![self.system_message(store, key)?];
            messages.extend(transcript.iter().cloned());

            let reply = self.complete(messages).await?;

            if reply.tool_calls.is_empty() {
                let content = reply.content.clone().unwrap_or_default();
                if content.is_empty() {
                    warn!(session = %key.session_id, "Empty reply from agent");
                }
                transcript.push(ChatMessage::new("assistant", content.clone()));
                self.save_transcript(key, transcript)?;
                return Ok(content);
            }

            if rounds == self.config.max_tool_rounds {
                return Err(invocation(format!(
                    "no reply after {} tool rounds",
                    self.config.max_tool_rounds
                )));
            }
            rounds += 1;

            let calls = reply.tool_calls.clone();
            transcript.push(reply);
            for call in calls {
                let arguments: Value = serde_json::from_str(&call.function.arguments)
                    .unwrap_or_else(|e| {
                        warn!(tool = %call.function.name, error = %e, "Unparsable tool arguments");
                        Value::Null
                    });
                info!(session = %key.session_id, tool = %call.function.name, "Tool call");

                let outcome =
                    self.config
                        .catalog
                        .execute(store, key, &call.function.name, &arguments)?;
                let content = serde_json::to_string(&outcome)
                    .map_err(|e| invocation(format!("cannot encode tool result: {}", e)))?;
                transcript.push(ChatMessage::tool(content, call.id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tool_rounds, 4);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_user_message_serialization() {
        let json = serde_json::to_value(ChatMessage::new("user", "hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_tool_message_serialization() {
        let json = serde_json::to_value(ChatMessage::tool("{}", "call_1")).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn test_parse_tool_call_response() {
        let body = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "purchase_course", "arguments": "{\"course_id\":\"x\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let message = &response.choices[0].message;
        assert!(message.content.is_none());
        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].function.name, "purchase_course");
        assert_eq!(message.tool_calls[0].call_type, "function");
    }

    #[test]
    fn test_new_runner() {
        let runner = CompletionsRunner::new(RunnerConfig::default()).unwrap();
        assert_eq!(runner.config().model, DEFAULT_MODEL);
    }
}
