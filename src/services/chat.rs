use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ModelParams;
use crate::error::ApiError;
use crate::models::{ChatMessage, ChatReply};
use crate::services::conversation::Responder;
use crate::services::openai::{CompletionBackend, CompletionRequest, UpstreamMessage};
use crate::services::{prompts, upstream_failure};

pub const MISSING_CONFIGURATION: &str = "OpenAI API configuration is missing";

/// Stateless: the caller sends the whole conversation every time.
pub struct ChatGateway {
    backend: Arc<dyn CompletionBackend>,
    params: ModelParams,
}

impl ChatGateway {
    pub fn new(backend: Arc<dyn CompletionBackend>, params: ModelParams) -> Self {
        ChatGateway { backend, params }
    }

    pub async fn respond(&self, messages: Vec<ChatMessage>) -> Result<ChatReply, ApiError> {
        if !self.backend.has_credentials() {
            return Err(ApiError::Configuration(MISSING_CONFIGURATION.to_string()));
        }

        let mut upstream = Vec::with_capacity(messages.len() + 1);
        upstream.push(UpstreamMessage::system(prompts::LEGAL_ASSISTANT_PROMPT));
        upstream.extend(messages.into_iter().map(UpstreamMessage::from));

        let request = CompletionRequest::new(&self.params, upstream);
        let completion = self
            .backend
            .complete(&request)
            .await
            .map_err(|e| upstream_failure(e, "Failed to get response from AI"))?;

        Ok(ChatReply {
            message: completion.content,
            usage: completion.usage,
        })
    }
}

#[async_trait]
impl Responder for ChatGateway {
    async fn reply(&self, messages: Vec<ChatMessage>) -> Result<ChatReply, ApiError> {
        self.respond(messages).await
    }
}
