use actix_web::{web, HttpResponse};
use serde_json::Value;

use crate::error::ApiError;
use crate::models::ChatMessage;
use crate::state::AppState;

pub const MESSAGES_REQUIRED: &str = "Messages array is required";
pub const INVALID_MESSAGE: &str = "Each message must have a valid role and content";

/// An empty array is accepted; anything that is not an array is not.
fn parse_messages(body: &[u8]) -> Result<Vec<ChatMessage>, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::bad_request(MESSAGES_REQUIRED))?;
    match value.get("messages") {
        Some(messages @ Value::Array(_)) => serde_json::from_value(messages.clone())
            .map_err(|_| ApiError::bad_request(INVALID_MESSAGE)),
        _ => Err(ApiError::bad_request(MESSAGES_REQUIRED)),
    }
}

pub async fn send_chat(
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let messages = parse_messages(&body)?;
    let reply = state.chat.respond(messages).await?;
    Ok(HttpResponse::Ok().json(reply))
}
