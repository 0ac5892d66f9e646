pub mod chat;
pub mod conversation;
pub mod document;

pub use chat::{ChatMessage, ChatReply, Role, Usage};
pub use conversation::{Conversation, Message};
pub use document::{DocumentAnalysis, DocumentFile, DocumentKind, UploadedDocument};

/// `<unix millis>-<random hex>`; ordering matters here, not global uniqueness.
pub fn new_id() -> String {
    format!(
        "{}-{:08x}",
        chrono::Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}
