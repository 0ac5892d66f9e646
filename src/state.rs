use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::models::Conversation;
use crate::services::analysis::AnalysisGateway;
use crate::services::chat::ChatGateway;
use crate::services::openai::CompletionBackend;

pub type SessionId = String;
pub type Sessions = Arc<Mutex<HashMap<SessionId, Conversation>>>;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Sessions,
    pub chat: Arc<ChatGateway>,
    pub analysis: Arc<AnalysisGateway>,
    pub text_document_char_limit: usize,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &AppConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            chat: Arc::new(ChatGateway::new(backend.clone(), config.chat.clone())),
            analysis: Arc::new(AnalysisGateway::new(backend, config.analysis.clone())),
            text_document_char_limit: config.text_document_char_limit,
            max_body_bytes: config.max_body_bytes,
        }
    }
}
