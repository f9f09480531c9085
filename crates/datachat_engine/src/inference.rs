use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::{InferenceError, InferenceFailure};

const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Clone)]
pub struct InferenceSettings {
    /// Base of an OpenAI-compatible API, e.g. `http://localhost:1234/v1`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234/v1".to_string(),
            api_key: None,
            model: "QuantFactory/Meta-Llama-3-8B-Instruct-GGUF".to_string(),
            temperature: 0.7,
            max_tokens: 800,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl InferenceSettings {
    pub fn options(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_context: Option<String>,
    pub user_text: String,
    pub options: CompletionOptions,
}

#[async_trait::async_trait]
pub trait InferenceClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `POST {base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    settings: InferenceSettings,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(settings: InferenceSettings) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| InferenceError::new(InferenceFailure::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self) -> Result<reqwest::Url, InferenceError> {
        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );
        reqwest::Url::parse(&url)
            .map_err(|err| InferenceError::new(InferenceFailure::InvalidUrl, err.to_string()))
    }
}

#[async_trait::async_trait]
impl InferenceClient for OpenAiCompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError> {
        let endpoint = self.endpoint()?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_context.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.user_text,
        });
        let body = ChatCompletionBody {
            model: &request.options.model,
            messages,
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
        };
        let payload = serde_json::to_vec(&body)
            .map_err(|err| InferenceError::new(InferenceFailure::InvalidRequest, err.to_string()))?;

        engine_debug!(
            "completion request url={} model={} bytes={}",
            endpoint,
            request.options.model,
            payload.len()
        );

        let mut builder = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        if let Some(key) = self.settings.api_key.as_deref() {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            let snippet: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            engine_warn!("completion failed status={} body={}", status, snippet);
            let message = if snippet.trim().is_empty() {
                status.to_string()
            } else {
                format!("{status}: {}", snippet.trim())
            };
            return Err(InferenceError::new(
                InferenceFailure::HttpStatus(status.as_u16()),
                message,
            ));
        }

        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes).map_err(|err| {
            InferenceError::new(InferenceFailure::MalformedResponse, err.to_string())
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                InferenceError::new(InferenceFailure::EmptyResponse, "response had no choices")
            })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> InferenceError {
    if err.is_timeout() {
        return InferenceError::new(InferenceFailure::Timeout, err.to_string());
    }
    InferenceError::new(InferenceFailure::Network, err.to_string())
}
