use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ModelParams;
use crate::error::ApiError;
use crate::models::{DocumentAnalysis, DocumentFile, DocumentKind};
use crate::services::composer::DocumentAnalyzer;
use crate::services::openai::{
    CompletionBackend, CompletionRequest, ContentPart, ImageUrl, MessageContent, UpstreamMessage,
};
use crate::services::{extract, prompts, upstream_failure};

pub const MISSING_API_KEY: &str = "OpenAI API key is missing";

pub struct AnalysisGateway {
    backend: Arc<dyn CompletionBackend>,
    params: ModelParams,
}

impl AnalysisGateway {
    pub fn new(backend: Arc<dyn CompletionBackend>, params: ModelParams) -> Self {
        AnalysisGateway { backend, params }
    }

    pub async fn analyze(&self, file: &DocumentFile) -> Result<DocumentAnalysis, ApiError> {
        if !self.backend.has_credentials() {
            return Err(ApiError::Configuration(MISSING_API_KEY.to_string()));
        }

        let kind = extract::classify(&file.mime_type, &file.name);
        log::info!("analyzing {} as {:?} ({} bytes)", file.name, kind, file.bytes.len());

        let (request_message, ocr_used) = match kind {
            DocumentKind::Image => (image_message(file), true),
            _ => {
                let text = document_text(kind, file).await?;
                if text.trim().is_empty() {
                    return Err(ApiError::bad_request(extract::EMPTY_DOCUMENT));
                }
                (UpstreamMessage::user(prompts::text_analysis_request(&text)), false)
            }
        };

        let request = CompletionRequest::new(
            &self.params,
            vec![UpstreamMessage::system(prompts::DOCUMENT_ANALYSIS_PROMPT), request_message],
        );
        let completion = self
            .backend
            .complete(&request)
            .await
            .map_err(|e| upstream_failure(e, "Failed to analyze document"))?;

        Ok(DocumentAnalysis {
            analysis: completion.content,
            file_name: file.name.clone(),
            usage: completion.usage,
            ocr_used,
        })
    }
}

async fn document_text(kind: DocumentKind, file: &DocumentFile) -> Result<String, ApiError> {
    match kind {
        DocumentKind::Docx => Ok(extract::docx_text(&file.bytes)),
        DocumentKind::Pdf => {
            let text = extract::pdf_text(file.bytes.clone()).await?;
            extract::require_pdf_text(text)
        }
        _ => extract::decode_text(kind, &file.bytes),
    }
}

/// The vision model does OCR and analysis in one call.
fn image_message(file: &DocumentFile) -> UpstreamMessage {
    UpstreamMessage {
        role: "user",
        content: MessageContent::Parts(vec![
            ContentPart::Text { text: prompts::IMAGE_ANALYSIS_INSTRUCTION.to_string() },
            ContentPart::ImageUrl { image_url: ImageUrl { url: extract::data_url(file) } },
        ]),
    }
}

#[async_trait]
impl DocumentAnalyzer for AnalysisGateway {
    async fn analyze_document(&self, file: &DocumentFile) -> Result<String, ApiError> {
        self.analyze(file).await.map(|a| a.analysis)
    }
}
