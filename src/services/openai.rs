use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{ModelParams, OpenAiConfig};
use crate::models::{ChatMessage, Usage};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpstreamMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

impl UpstreamMessage {
    pub fn system(content: &str) -> Self {
        UpstreamMessage { role: "system", content: MessageContent::Text(content.to_string()) }
    }

    pub fn user(content: impl Into<String>) -> Self {
        UpstreamMessage { role: "user", content: MessageContent::Text(content.into()) }
    }
}

impl From<ChatMessage> for UpstreamMessage {
    fn from(msg: ChatMessage) -> Self {
        UpstreamMessage { role: msg.role.as_str(), content: MessageContent::Text(msg.content) }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<UpstreamMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl CompletionRequest {
    pub fn new(params: &ModelParams, messages: Vec<UpstreamMessage>) -> Self {
        CompletionRequest {
            model: params.model.clone(),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

/// The text-generation / vision provider the gateways talk to.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn has_credentials(&self) -> bool;

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, UpstreamError>;
}

#[derive(Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub fn parse_completion(body: &str) -> Result<Completion, UpstreamError> {
    let parsed: ChatResponseBody =
        serde_json::from_str(body).map_err(|e| UpstreamError::Malformed(e.to_string()))?;
    let message = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .ok_or_else(|| UpstreamError::Malformed(body.chars().take(500).collect()))?;

    Ok(Completion {
        content: message.content.unwrap_or_default(),
        usage: parsed.usage,
    })
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(OpenAiClient {
            client: builder.build()?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, UpstreamError> {
        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status { status: status.as_u16(), body: text });
        }

        log::debug!("{} replied {} ({} bytes)", request.model, status, text.len());
        parse_completion(&text)
    }
}
