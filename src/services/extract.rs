use std::io::{Cursor, Read};

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ApiError;
use crate::models::{DocumentFile, DocumentKind, UploadedDocument};

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const UNSUPPORTED_FILE: &str =
    "Unsupported file type. Please upload .txt, .docx, .pdf, or image files.";
pub const SCANNED_PDF: &str = "This appears to be a scanned PDF with no extractable text. Please upload the document as an image (PNG/JPG) for OCR processing, or upload a text-based PDF.";
pub const PDF_PARSE_FAILED: &str = "Failed to parse PDF. Please try uploading as an image instead.";
pub const EMPTY_DOCUMENT: &str =
    "Could not extract text from the document. The file may be empty or corrupted.";

/// Below this many characters a PDF text layer is treated as absent.
const MIN_PDF_TEXT_CHARS: usize = 10;

const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

fn extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Declared MIME type is not trusted alone: either it or the extension may
/// identify the kind.
pub fn classify(mime_type: &str, file_name: &str) -> DocumentKind {
    let mime = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let ext = extension(file_name).unwrap_or_default();

    if mime == DOCX_MIME || ext == "docx" {
        DocumentKind::Docx
    } else if mime == "text/plain" || ext == "txt" {
        DocumentKind::Text
    } else if mime == "application/pdf" || ext == "pdf" {
        DocumentKind::Pdf
    } else if mime.starts_with("image/") || IMAGE_EXTENSIONS.iter().any(|(e, _)| *e == ext) {
        DocumentKind::Image
    } else {
        DocumentKind::Unsupported
    }
}

/// MIME type to put in an image data URL, falling back to the extension when
/// the declared type is missing or not an image type.
pub fn image_mime(file: &DocumentFile) -> String {
    if file.mime_type.starts_with("image/") {
        return file.mime_type.clone();
    }
    extension(&file.name)
        .and_then(|ext| IMAGE_EXTENSIONS.iter().find(|(e, _)| *e == ext))
        .map(|(_, mime)| mime.to_string())
        .unwrap_or_else(|| "image/png".to_string())
}

pub fn data_url(file: &DocumentFile) -> String {
    format!("data:{};base64,{}", image_mime(file), B64.encode(&file.bytes))
}

/// Text-like files: plain text is decoded leniently, anything unrecognised
/// must be valid UTF-8 or it is rejected.
pub fn decode_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, ApiError> {
    match kind {
        DocumentKind::Text => Ok(String::from_utf8_lossy(bytes).into_owned()),
        _ => String::from_utf8(bytes.to_vec()).map_err(|_| ApiError::bad_request(UNSUPPORTED_FILE)),
    }
}

/// Turns an uploaded file into a pending document.
pub fn ingest(file: DocumentFile) -> Result<UploadedDocument, ApiError> {
    let kind = classify(&file.mime_type, &file.name);
    let (content, preview) = match kind {
        DocumentKind::Image => (None, Some(data_url(&file))),
        DocumentKind::Text | DocumentKind::Unsupported => (Some(decode_text(kind, &file.bytes)?), None),
        DocumentKind::Docx | DocumentKind::Pdf => (None, None),
    };

    Ok(UploadedDocument {
        id: crate::models::new_id(),
        name: file.name.clone(),
        size: file.bytes.len(),
        mime_type: file.mime_type.clone(),
        kind,
        is_image: kind == DocumentKind::Image,
        is_pdf: kind == DocumentKind::Pdf,
        content,
        preview,
        analysis: None,
        file,
    })
}

/// Raw text of a .docx body. Any failure yields an empty string.
pub fn docx_text(bytes: &[u8]) -> String {
    match read_docx(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("docx extraction failed: {}", e);
            String::new()
        }
    }
}

fn read_docx(bytes: &[u8]) -> Result<String, Box<dyn std::error::Error>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name("word/document.xml")?.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out.trim_end().to_string())
}

/// Text layer of a PDF. Extraction errors yield an empty string; a panic in
/// the extractor is reported as a parse failure.
pub async fn pdf_text(bytes: Vec<u8>) -> Result<String, ApiError> {
    let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;
    match joined {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            log::warn!("pdf extraction failed: {}", e);
            Ok(String::new())
        }
        Err(e) => {
            log::error!("pdf extractor aborted: {}", e);
            Err(ApiError::bad_request(PDF_PARSE_FAILED))
        }
    }
}

/// No OCR fallback for scans: the caller is told to resend as an image.
pub fn require_pdf_text(text: String) -> Result<String, ApiError> {
    if text.trim().chars().count() < MIN_PDF_TEXT_CHARS {
        return Err(ApiError::bad_request(SCANNED_PDF));
    }
    Ok(text)
}
