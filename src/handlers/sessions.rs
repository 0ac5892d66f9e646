use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::documents::read_files;
use crate::models::{Conversation, UploadedDocument};
use crate::services::conversation::{self, SendOutcome, SEND_IN_FLIGHT, SESSION_NOT_FOUND};
use crate::services::extract;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub message: String,
}

fn not_found() -> ApiError {
    ApiError::NotFound(SESSION_NOT_FOUND.to_string())
}

fn session_json(session_id: &str, conv: &Conversation) -> serde_json::Value {
    json!({
        "session_id": session_id,
        "messages": conv.messages(),
        "count": conv.messages().len(),
        "pending_documents": conv.pending(),
        "sending": conv.is_sending(),
    })
}

pub async fn create_session(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let session_id = Uuid::new_v4().to_string();
    conversation::lock(&state.sessions)?.insert(session_id.clone(), Conversation::default());
    log::info!("created session {}", session_id);
    Ok(HttpResponse::Created().json(json!({ "session_id": session_id })))
}

pub async fn get_session(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let session_id = path.into_inner();
    let sessions = conversation::lock(&state.sessions)?;
    let conv = sessions.get(&session_id).ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(session_json(&session_id, conv)))
}

pub async fn clear_session(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let session_id = path.into_inner();
    let mut sessions = conversation::lock(&state.sessions)?;
    if !sessions.get_mut(&session_id).ok_or_else(not_found)?.clear() {
        return Err(ApiError::Conflict(SEND_IN_FLIGHT.to_string()));
    }
    Ok(HttpResponse::Ok().json(json!({
        "status": "cleared",
        "session_id": session_id,
    })))
}

/// All files must be readable or none are added.
pub async fn upload_documents(
    path: web::Path<String>,
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let session_id = path.into_inner();
    if !conversation::lock(&state.sessions)?.contains_key(&session_id) {
        return Err(not_found());
    }

    let files = read_files(payload, &["file", "files"], state.max_body_bytes).await?;
    if files.is_empty() {
        return Err(ApiError::bad_request("No file provided"));
    }
    let docs = files
        .into_iter()
        .map(extract::ingest)
        .collect::<Result<Vec<UploadedDocument>, ApiError>>()?;

    let mut sessions = conversation::lock(&state.sessions)?;
    let conv = sessions.get_mut(&session_id).ok_or_else(not_found)?;
    conv.add_documents(docs);
    Ok(HttpResponse::Ok().json(json!({
        "session_id": session_id,
        "pending_documents": conv.pending(),
    })))
}

pub async fn remove_document(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (session_id, document_id) = path.into_inner();
    let mut sessions = conversation::lock(&state.sessions)?;
    let conv = sessions.get_mut(&session_id).ok_or_else(not_found)?;
    if !conv.remove_document(&document_id) {
        return Err(ApiError::NotFound("Document not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(json!({
        "session_id": session_id,
        "pending_documents": conv.pending(),
    })))
}

pub async fn send_message(
    path: web::Path<String>,
    body: web::Json<SendRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let session_id = path.into_inner();
    let outcome = conversation::send_message(
        &state.sessions,
        &session_id,
        &body.message,
        state.analysis.as_ref(),
        state.chat.as_ref(),
        state.text_document_char_limit,
    )
    .await?;

    match outcome {
        SendOutcome::Noop => Ok(HttpResponse::NoContent().finish()),
        SendOutcome::Sent { user, assistant, usage } => Ok(HttpResponse::Ok().json(json!({
            "session_id": session_id,
            "user_message": user,
            "assistant_message": assistant,
            "usage": usage,
        }))),
    }
}
