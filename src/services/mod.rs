pub mod analysis;
pub mod chat;
pub mod composer;
pub mod conversation;
pub mod extract;
pub mod openai;
pub mod prompts;

use crate::error::ApiError;
use openai::UpstreamError;

/// Maps a provider failure to what the client sees. The raw upstream body is
/// only ever logged.
pub(crate) fn upstream_failure(err: UpstreamError, message: &str) -> ApiError {
    match err {
        UpstreamError::Status { status, body } => {
            log::error!("OpenAI API error {}: {}", status, body);
            ApiError::Upstream { status, message: message.to_string() }
        }
        UpstreamError::Malformed(body) => {
            log::error!("Invalid OpenAI response: {}", body);
            ApiError::InvalidResponse
        }
        UpstreamError::Transport(e) => {
            log::error!("OpenAI request failed to send: {}", e);
            ApiError::Internal
        }
    }
}
