use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{DocumentFile, UploadedDocument};

/// Turns one document into markdown analysis text.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze_document(&self, file: &DocumentFile) -> Result<String, ApiError>;
}

#[derive(Debug)]
pub enum DocumentOutcome {
    Analyzed { name: String, body: String },
    Failed { name: String, error: ApiError },
    /// Not included: either empty or behind an earlier failure.
    Skipped { name: String },
}

/// Cuts at a character count; not sentence aware.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Processes documents one at a time. The first failure stops the batch and
/// every later document is reported as skipped. Successful analyses are
/// cached on the document so a retry does not repeat them.
pub async fn analyze_documents<A>(
    analyzer: &A,
    docs: &mut [UploadedDocument],
    char_limit: usize,
) -> Vec<DocumentOutcome>
where
    A: DocumentAnalyzer + ?Sized,
{
    let mut outcomes = Vec::with_capacity(docs.len());
    let mut aborted = false;

    for doc in docs.iter_mut() {
        let name = doc.name.clone();
        if aborted {
            outcomes.push(DocumentOutcome::Skipped { name });
            continue;
        }

        if doc.kind.needs_analysis() {
            if let Some(cached) = &doc.analysis {
                outcomes.push(DocumentOutcome::Analyzed { name, body: cached.clone() });
                continue;
            }
            log::info!("analyzing document {}", name);
            match analyzer.analyze_document(&doc.file).await {
                Ok(body) => {
                    doc.analysis = Some(body.clone());
                    outcomes.push(DocumentOutcome::Analyzed { name, body });
                }
                Err(error) => {
                    log::warn!("analysis of {} failed: {}", name, error);
                    aborted = true;
                    outcomes.push(DocumentOutcome::Failed { name, error });
                }
            }
        } else {
            match doc.content.as_deref().filter(|c| !c.is_empty()) {
                Some(content) => outcomes.push(DocumentOutcome::Analyzed {
                    name,
                    body: truncate_chars(content, char_limit).to_string(),
                }),
                None => outcomes.push(DocumentOutcome::Skipped { name }),
            }
        }
    }

    outcomes
}

/// Document sections in order, or the error of the document that failed.
pub fn collect_sections(outcomes: Vec<DocumentOutcome>) -> Result<Vec<(String, String)>, ApiError> {
    let mut sections = Vec::new();
    let mut failure = None;
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            DocumentOutcome::Analyzed { name, body } => sections.push((name, body)),
            DocumentOutcome::Failed { name, error } => failure = Some((name, error)),
            DocumentOutcome::Skipped { name } => skipped.push(name),
        }
    }

    match failure {
        Some((name, error)) => {
            log::warn!(
                "document batch aborted at {}; not analyzed: [{}]",
                name,
                skipped.join(", ")
            );
            Err(error)
        }
        None => {
            if !skipped.is_empty() {
                log::info!("empty documents left out: [{}]", skipped.join(", "));
            }
            Ok(sections)
        }
    }
}

/// Builds the outgoing user message, or `None` when there is nothing to send.
pub fn compose_message(query: &str, sections: &[(String, String)]) -> Option<String> {
    let query = query.trim();
    let documents: String = sections
        .iter()
        .map(|(name, body)| format!("\n\n--- Document: {} ---\n{}", name, body))
        .collect();

    match (query.is_empty(), documents.is_empty()) {
        (true, true) => None,
        (false, true) => Some(query.to_string()),
        (false, false) => Some(format!(
            "{}\n\nPlease analyze the following document(s) in context of my question:{}",
            query, documents
        )),
        (true, false) => Some(format!(
            "Please analyze the following document(s) and provide a detailed summary with key legal points:{}",
            documents
        )),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::DocumentFile;
    use crate::services::extract;
    use std::sync::Mutex;

    /// Answers `analysis of <name>` unless the file name is listed as failing.
    pub(crate) struct FakeAnalyzer {
        pub failing: Vec<String>,
        pub seen: Mutex<Vec<String>>,
    }

    impl FakeAnalyzer {
        pub fn new() -> Self {
            FakeAnalyzer { failing: vec![], seen: Mutex::new(vec![]) }
        }

        pub fn failing_on(name: &str) -> Self {
            FakeAnalyzer { failing: vec![name.to_string()], seen: Mutex::new(vec![]) }
        }

        pub fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentAnalyzer for FakeAnalyzer {
        async fn analyze_document(&self, file: &DocumentFile) -> Result<String, ApiError> {
            self.seen.lock().unwrap().push(file.name.clone());
            if self.failing.contains(&file.name) {
                return Err(ApiError::bad_request(extract::SCANNED_PDF));
            }
            Ok(format!("analysis of {}", file.name))
        }
    }

    pub(crate) fn upload(name: &str, mime: &str, bytes: &[u8]) -> UploadedDocument {
        extract::ingest(DocumentFile { name: name.into(), mime_type: mime.into(), bytes: bytes.to_vec() })
            .unwrap()
    }

    #[test]
    fn truncation_counts_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn compose_variants() {
        assert_eq!(compose_message("  ", &[]), None);
        assert_eq!(compose_message(" What is IPC 420? ", &[]).as_deref(), Some("What is IPC 420?"));

        let sections = vec![("lease.pdf".to_string(), "summary".to_string())];
        assert_eq!(
            compose_message("Is this fair?", &sections).unwrap(),
            "Is this fair?\n\nPlease analyze the following document(s) in context of my question:\n\n--- Document: lease.pdf ---\nsummary"
        );
        assert_eq!(
            compose_message("", &sections).unwrap(),
            "Please analyze the following document(s) and provide a detailed summary with key legal points:\n\n--- Document: lease.pdf ---\nsummary"
        );
    }

    #[actix_web::test]
    async fn text_documents_are_inlined_and_truncated() {
        let analyzer = FakeAnalyzer::new();
        let long = "a".repeat(3000);
        let mut docs = vec![upload("notes.txt", "text/plain", b"Hello"), upload("long.txt", "", long.as_bytes())];

        let outcomes = analyze_documents(&analyzer, &mut docs, 2000).await;
        let sections = collect_sections(outcomes).unwrap();

        assert_eq!(sections[0], ("notes.txt".to_string(), "Hello".to_string()));
        assert_eq!(sections[1].1.chars().count(), 2000);
        assert!(analyzer.seen().is_empty());
    }

    #[actix_web::test]
    async fn first_failure_skips_the_rest() {
        let analyzer = FakeAnalyzer::failing_on("scan.pdf");
        let mut docs = vec![
            upload("photo.png", "image/png", &[1]),
            upload("scan.pdf", "application/pdf", b"%PDF"),
            upload("contract.docx", "", b"zip"),
        ];

        let outcomes = analyze_documents(&analyzer, &mut docs, 5000).await;

        assert!(matches!(outcomes[0], DocumentOutcome::Analyzed { .. }));
        assert!(matches!(&outcomes[1], DocumentOutcome::Failed { name, .. } if name == "scan.pdf"));
        assert!(matches!(&outcomes[2], DocumentOutcome::Skipped { name } if name == "contract.docx"));
        assert_eq!(analyzer.seen(), vec!["photo.png", "scan.pdf"]);
        assert_eq!(docs[0].analysis.as_deref(), Some("analysis of photo.png"));

        let err = collect_sections(outcomes).unwrap_err();
        assert_eq!(err.to_string(), extract::SCANNED_PDF);
    }

    #[actix_web::test]
    async fn cached_analysis_is_reused() {
        let analyzer = FakeAnalyzer::new();
        let mut docs = vec![upload("photo.png", "image/png", &[1])];
        docs[0].analysis = Some("earlier".into());

        let sections = collect_sections(analyze_documents(&analyzer, &mut docs, 5000).await).unwrap();
        assert_eq!(sections[0].1, "earlier");
        assert!(analyzer.seen().is_empty());
    }

    #[actix_web::test]
    async fn empty_text_document_is_left_out() {
        let analyzer = FakeAnalyzer::new();
        let mut docs = vec![upload("empty.txt", "text/plain", b"")];
        let outcomes = analyze_documents(&analyzer, &mut docs, 5000).await;
        assert!(matches!(outcomes[0], DocumentOutcome::Skipped { .. }));
        assert!(collect_sections(outcomes).unwrap().is_empty());
    }
}
