use std::collections::HashMap;
use std::sync::MutexGuard;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{ChatMessage, ChatReply, Conversation, Message, Role, UploadedDocument, Usage};
use crate::services::composer::{self, DocumentAnalyzer};
use crate::state::{SessionId, Sessions};

pub const SESSION_NOT_FOUND: &str = "Session not found";
pub const SEND_IN_FLIGHT: &str = "A message is already being sent";
const DEFAULT_DOCUMENT_REQUEST: &str = "Analyze uploaded document(s)";

/// Produces the assistant's next turn for a full conversation.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, messages: Vec<ChatMessage>) -> Result<ChatReply, ApiError>;
}

#[derive(Debug)]
pub enum SendOutcome {
    /// Nothing typed and nothing attached.
    Noop,
    Sent {
        user: Message,
        assistant: Message,
        usage: Option<Usage>,
    },
}

pub fn lock(sessions: &Sessions) -> Result<MutexGuard<'_, HashMap<SessionId, Conversation>>, ApiError> {
    sessions.lock().map_err(|_| {
        log::error!("session store lock poisoned");
        ApiError::Internal
    })
}

/// Sends `query` plus all pending documents of a session.
///
/// Nothing is appended unless the whole pipeline succeeds; on failure the
/// documents go back to the pending list with whatever analyses were
/// obtained, so a retry does not need a re-upload.
pub async fn send_message<A, R>(
    sessions: &Sessions,
    session_id: &str,
    query: &str,
    analyzer: &A,
    responder: &R,
    char_limit: usize,
) -> Result<SendOutcome, ApiError>
where
    A: DocumentAnalyzer + ?Sized,
    R: Responder + ?Sized,
{
    let (mut docs, history) = {
        let mut guard = lock(sessions)?;
        let conv = guard
            .get_mut(session_id)
            .ok_or_else(|| ApiError::NotFound(SESSION_NOT_FOUND.to_string()))?;

        if conv.is_sending() {
            return Err(ApiError::Conflict(SEND_IN_FLIGHT.to_string()));
        }
        if query.trim().is_empty() && conv.pending().is_empty() {
            return Ok(SendOutcome::Noop);
        }
        let docs = conv
            .begin_send()
            .ok_or_else(|| ApiError::Conflict(SEND_IN_FLIGHT.to_string()))?;
        (docs, conv.history())
    };

    let result = compose_and_reply(&mut docs, history, query, analyzer, responder, char_limit).await;

    let mut guard = lock(sessions)?;
    let Some(conv) = guard.get_mut(session_id) else {
        log::warn!("session {} vanished during send", session_id);
        return result.map(|_| SendOutcome::Noop);
    };

    match result {
        Ok((content, reply)) => {
            let names = docs.iter().map(|d| d.name.clone()).collect();
            let user = Message::new(Role::User, content).with_documents(names);
            let assistant = Message::new(Role::Assistant, reply.message);
            conv.commit_send(user.clone(), assistant.clone());
            Ok(SendOutcome::Sent { user, assistant, usage: reply.usage })
        }
        Err(e) => {
            conv.abort_send(docs);
            Err(e)
        }
    }
}

async fn compose_and_reply<A, R>(
    docs: &mut [UploadedDocument],
    mut payload: Vec<ChatMessage>,
    query: &str,
    analyzer: &A,
    responder: &R,
    char_limit: usize,
) -> Result<(String, ChatReply), ApiError>
where
    A: DocumentAnalyzer + ?Sized,
    R: Responder + ?Sized,
{
    let outcomes = composer::analyze_documents(analyzer, docs, char_limit).await;
    let sections = composer::collect_sections(outcomes)?;
    let content = composer::compose_message(query, &sections)
        .unwrap_or_else(|| DEFAULT_DOCUMENT_REQUEST.to_string());

    payload.push(ChatMessage { role: Role::User, content: content.clone() });
    let reply = responder.reply(payload).await?;
    Ok((content, reply))
}
