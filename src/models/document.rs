use serde::{Deserialize, Serialize};

use crate::models::Usage;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Text,
    Docx,
    Pdf,
    Image,
    Unsupported,
}

impl DocumentKind {
    /// Kinds whose content must go through the analysis gateway rather than
    /// being inlined into the conversation.
    pub fn needs_analysis(&self) -> bool {
        matches!(self, DocumentKind::Docx | DocumentKind::Pdf | DocumentKind::Image)
    }
}

/// A file as received over multipart: name, declared MIME type and bytes.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize, Clone)]
pub struct UploadedDocument {
    pub id: String,
    pub name: String,
    pub size: usize,
    pub mime_type: String,
    pub kind: DocumentKind,
    pub is_image: bool,
    pub is_pdf: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(skip)]
    pub analysis: Option<String>,
    #[serde(skip)]
    pub file: DocumentFile,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub analysis: String,
    pub file_name: String,
    pub usage: Option<Usage>,
    pub ocr_used: bool,
}
