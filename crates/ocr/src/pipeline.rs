use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use ledgerscan_core::LineRecord;

use crate::lines::LineReconstructor;
use crate::pages::{flatten_pages, PagePolicy};
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::Line;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// The result of reconstructing one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementScan {
    pub pages: usize,
    pub detections: usize,
    /// Reading-order lines, empty when the OCR output had no usable structure.
    pub lines: Vec<LineRecord>,
}

/// Orchestrates: recognize → flatten (page policy) → reconstruct lines.
pub struct StatementPipeline<R: OcrBackend> {
    recognizer: R,
    policy: PagePolicy,
    reconstructor: LineReconstructor,
}

impl<R: OcrBackend> StatementPipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            policy: PagePolicy::default(),
            reconstructor: LineReconstructor::default(),
        }
    }

    pub fn with_policy(mut self, policy: PagePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_reconstructor(mut self, reconstructor: LineReconstructor) -> Self {
        self.reconstructor = reconstructor;
        self
    }

    /// Process a statement document on disk.
    pub async fn process_file(&self, path: &Path) -> Result<StatementScan, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        info!("Scanning statement: {}", path.display());
        self.process_bytes(&bytes)
    }

    /// Structural failures (unknown shape, malformed detections) are logged
    /// and produce an empty scan; engine failures are returned.
    pub fn process_bytes(&self, data: &[u8]) -> Result<StatementScan, PipelineError> {
        let pages = match self.recognizer.recognize(data) {
            Ok(pages) => pages,
            Err(e) if e.is_structural() => {
                warn!("No reconstructable structure: {e}");
                return Ok(StatementScan { pages: 0, detections: 0, lines: Vec::new() });
            }
            Err(e) => return Err(e.into()),
        };
        let page_count = pages.len();

        let detections = match flatten_pages(pages, &self.policy) {
            Ok(detections) => detections,
            Err(e) => {
                warn!("No reconstructable structure: {e}");
                return Ok(StatementScan { pages: page_count, detections: 0, lines: Vec::new() });
            }
        };
        let detection_count = detections.len();
        if detections.is_empty() {
            warn!("No detections found");
        }

        let lines: Vec<LineRecord> = self
            .reconstructor
            .reconstruct(detections)
            .iter()
            .map(Line::to_record)
            .collect();

        info!(
            pages = page_count,
            detections = detection_count,
            lines = lines.len(),
            "statement scanned"
        );

        Ok(StatementScan {
            pages: page_count,
            detections: detection_count,
            lines,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{JsonDumpRecognizer, MockRecognizer};
    use crate::types::{OcrPage, StructuredPage};

    struct FailingRecognizer;

    impl OcrBackend for FailingRecognizer {
        fn recognize(&self, _document: &[u8]) -> Result<Vec<OcrPage>, OcrError> {
            Err(OcrError::Engine("engine crashed".into()))
        }
    }

    fn quad(x: f64, y: f64) -> Vec<[f64; 2]> {
        vec![[x, y], [x + 40.0, y], [x + 40.0, y + 9.0], [x, y + 9.0]]
    }

    fn statement_page() -> OcrPage {
        OcrPage::Structured(StructuredPage {
            rec_texts: vec![
                "PAYNOW TRANSFER".into(),
                "01 AUG".into(),
                "25.00".into(),
                "OTHR 1234".into(),
                "JUICY FRESH PTE LTD".into(),
            ],
            rec_polys: vec![
                quad(80.0, 201.0),
                quad(0.0, 200.0),
                quad(400.0, 203.0),
                quad(80.0, 225.0),
                quad(80.0, 250.0),
            ],
            rec_scores: Some(vec![0.99, 0.98, 0.97, 0.9, 0.95]),
        })
    }

    #[test]
    fn process_bytes_reconstructs_lines() {
        let pipeline = StatementPipeline::new(MockRecognizer::new(vec![statement_page()]));
        let scan = pipeline.process_bytes(b"ignored").unwrap();
        assert_eq!(scan.pages, 1);
        assert_eq!(scan.detections, 5);
        assert_eq!(scan.lines.len(), 3);
        assert_eq!(scan.lines[0].raw_text, "01 AUG PAYNOW TRANSFER 25.00");
        assert_eq!(scan.lines[2].parts, vec!["JUICY FRESH PTE LTD"]);
    }

    #[test]
    fn malformed_output_yields_empty_scan() {
        let pipeline = StatementPipeline::new(JsonDumpRecognizer);
        let scan = pipeline.process_bytes(b"{\"unexpected\": true}").unwrap();
        assert!(scan.lines.is_empty());

        let bad_poly = br#"[[[[[0,0],[1,1]],["A",0.9]]]]"#;
        let scan = pipeline.process_bytes(bad_poly).unwrap();
        assert!(scan.lines.is_empty());
        assert_eq!(scan.pages, 1);
    }

    #[test]
    fn engine_failure_is_an_error() {
        let pipeline = StatementPipeline::new(FailingRecognizer);
        assert!(matches!(
            pipeline.process_bytes(b""),
            Err(PipelineError::Ocr(OcrError::Engine(_)))
        ));
    }

    #[test]
    fn tighter_threshold_splits_skewed_row() {
        let pipeline = StatementPipeline::new(MockRecognizer::new(vec![statement_page()]))
            .with_reconstructor(LineReconstructor::new(1.0));
        let scan = pipeline.process_bytes(b"").unwrap();
        assert_eq!(scan.lines[0].parts, vec!["01 AUG", "PAYNOW TRANSFER"]);
        assert_eq!(scan.lines[1].parts, vec!["25.00"]);
    }

    #[tokio::test]
    async fn process_file_reads_json_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.json");
        let doc = serde_json::to_vec(&vec![statement_page()]).unwrap();
        std::fs::write(&path, doc).unwrap();

        let pipeline = StatementPipeline::new(JsonDumpRecognizer).with_policy(PagePolicy {
            skip_leading_pages: 0,
            end_marker: Some("juicy".into()),
        });
        let scan = pipeline.process_file(&path).await.unwrap();
        assert_eq!(scan.lines.len(), 2);
    }

    #[tokio::test]
    async fn process_file_missing_is_io_error() {
        let pipeline = StatementPipeline::new(JsonDumpRecognizer);
        let err = pipeline
            .process_file(Path::new("/definitely/not/here.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
