use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, Role, UploadedDocument};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Message {
            id: super::new_id(),
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            documents: None,
        }
    }

    pub fn with_documents(mut self, names: Vec<String>) -> Self {
        if !names.is_empty() {
            self.documents = Some(names);
        }
        self
    }

    pub fn to_chat(&self) -> ChatMessage {
        ChatMessage { role: self.role, content: self.content.clone() }
    }
}

/// One chat session: append-only messages plus documents waiting to be sent.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    pending: Vec<UploadedDocument>,
    sending: bool,
}

impl Conversation {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending(&self) -> &[UploadedDocument] {
        &self.pending
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Refused while a send is in flight, since its reply would land on
    /// the cleared history.
    pub fn clear(&mut self) -> bool {
        if self.sending {
            return false;
        }
        self.messages.clear();
        self.pending.clear();
        true
    }

    pub fn add_documents(&mut self, docs: impl IntoIterator<Item = UploadedDocument>) {
        self.pending.extend(docs);
    }

    pub fn remove_document(&mut self, id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|d| d.id != id);
        self.pending.len() != before
    }

    /// The history to send upstream, in append order.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages.iter().map(Message::to_chat).collect()
    }

    /// Marks a send as in flight and hands over the pending documents.
    /// Returns `None` if another send has not finished yet.
    pub fn begin_send(&mut self) -> Option<Vec<UploadedDocument>> {
        if self.sending {
            return None;
        }
        self.sending = true;
        Some(std::mem::take(&mut self.pending))
    }

    /// Ends a failed send, putting documents back in front of anything
    /// uploaded meanwhile.
    pub fn abort_send(&mut self, mut docs: Vec<UploadedDocument>) {
        docs.append(&mut self.pending);
        self.pending = docs;
        self.sending = false;
    }

    pub fn commit_send(&mut self, user: Message, assistant: Message) {
        self.messages.push(user);
        self.messages.push(assistant);
        self.sending = false;
    }
}
