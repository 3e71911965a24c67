use thiserror::Error;

use crate::types::OcrPage;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unrecognized OCR result shape: {0}")]
    UnknownShape(String),
    #[error("Malformed detection: {0}")]
    MalformedDetection(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
}

impl OcrError {
    /// Structural failures mean "nothing reconstructable"; callers continue
    /// with zero lines instead of aborting.
    pub fn is_structural(&self) -> bool {
        !matches!(self, OcrError::Engine(_))
    }
}

/// Abstraction over an OCR engine.
/// Implementations accept a statement document and return per-page detections.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, document: &[u8]) -> Result<Vec<OcrPage>, OcrError>;
}

// ── JSON dump backend ────────────────────────────────────────────────────────

/// Reads the JSON output an external engine produced for a statement:
/// an array of pages in either accepted shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDumpRecognizer;

impl OcrBackend for JsonDumpRecognizer {
    fn recognize(&self, document: &[u8]) -> Result<Vec<OcrPage>, OcrError> {
        Ok(serde_json::from_slice(document)?)
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns preset pages regardless of the document.
pub struct MockRecognizer {
    pub pages: Vec<OcrPage>,
}

impl MockRecognizer {
    pub fn new(pages: Vec<OcrPage>) -> Self {
        Self { pages }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _document: &[u8]) -> Result<Vec<OcrPage>, OcrError> {
        Ok(self.pages.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_dump_reads_page_array() {
        let doc = br#"[{"rec_texts":["A"],"rec_polys":[[[0,0],[1,0],[1,1],[0,1]]],"rec_scores":[0.8]}, null]"#;
        let pages = JsonDumpRecognizer.recognize(doc).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], OcrPage::Flat(None));
    }

    #[test]
    fn json_dump_rejects_garbage_as_structural() {
        let err = JsonDumpRecognizer.recognize(b"not json").unwrap_err();
        assert!(matches!(err, OcrError::Json(_)));
        assert!(err.is_structural());
    }

    #[test]
    fn engine_errors_are_not_structural() {
        assert!(!OcrError::Engine("model missing".into()).is_structural());
    }

    #[test]
    fn mock_ignores_document_content() {
        let r = MockRecognizer::new(vec![OcrPage::Flat(None)]);
        assert_eq!(r.recognize(b"anything").unwrap().len(), 1);
        assert_eq!(r.recognize(b"").unwrap().len(), 1);
    }
}
