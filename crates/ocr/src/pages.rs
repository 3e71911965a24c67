use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::recognizer::OcrError;
use crate::types::{Detection, OcrPage};

/// Which parts of a statement carry the transaction ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePolicy {
    /// Leading pages (cover letters, summaries) dropped before flattening.
    #[serde(default)]
    pub skip_leading_pages: usize,
    /// Sentinel text closing the ledger, matched case-insensitively. The
    /// detection containing it and everything after it are dropped.
    #[serde(default)]
    pub end_marker: Option<String>,
}

/// Flatten per-page engine output into one detection stream, preserving page order.
///
/// The serialization shape is taken from the first page and every later page
/// must share it; a `null` first page is an unknown shape.
pub fn flatten_pages(
    pages: Vec<OcrPage>,
    policy: &PagePolicy,
) -> Result<Vec<Detection>, OcrError> {
    let structured = match pages.first() {
        None => return Ok(Vec::new()),
        Some(OcrPage::Structured(_)) => true,
        Some(OcrPage::Flat(Some(_))) => false,
        Some(OcrPage::Flat(None)) => {
            return Err(OcrError::UnknownShape("first page is empty".to_string()))
        }
    };

    let mut detections = Vec::new();
    for (index, page) in pages.into_iter().enumerate() {
        if index < policy.skip_leading_pages {
            debug!(page = index + 1, "skipping leading page");
            continue;
        }
        match (structured, page) {
            (true, OcrPage::Structured(page)) => {
                let texts = page.rec_texts;
                if page.rec_polys.len() != texts.len() {
                    return Err(OcrError::MalformedDetection(format!(
                        "page {}: {} texts but {} polygons",
                        index + 1,
                        texts.len(),
                        page.rec_polys.len()
                    )));
                }
                let scores = page.rec_scores.unwrap_or_else(|| vec![1.0; texts.len()]);
                if scores.len() != texts.len() {
                    return Err(OcrError::MalformedDetection(format!(
                        "page {}: {} texts but {} scores",
                        index + 1,
                        texts.len(),
                        scores.len()
                    )));
                }
                for ((text, poly), score) in texts.into_iter().zip(&page.rec_polys).zip(scores) {
                    detections.push(Detection::from_vertices(poly, text, score)?);
                }
            }
            (false, OcrPage::Flat(Some(items))) => {
                for (poly, (text, score)) in items {
                    detections.push(Detection::from_vertices(&poly, text, score)?);
                }
            }
            (false, OcrPage::Flat(None)) => {}
            _ => {
                return Err(OcrError::UnknownShape(format!(
                    "page {} does not match the shape of the first page",
                    index + 1
                )))
            }
        }
    }

    if let Some(marker) = policy.end_marker.as_deref() {
        truncate_at_marker(&mut detections, marker);
    }

    Ok(detections)
}

fn truncate_at_marker(detections: &mut Vec<Detection>, marker: &str) {
    let marker = marker.to_lowercase();
    if marker.is_empty() {
        return;
    }
    if let Some(pos) = detections
        .iter()
        .position(|d| d.text.to_lowercase().contains(&marker))
    {
        debug!(kept = pos, dropped = detections.len() - pos, "truncated at end marker");
        detections.truncate(pos);
    }
}
