use ledgerscan_core::LineRecord;
use serde::{Deserialize, Serialize};

use crate::recognizer::OcrError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Point { x, y }
    }
}

/// One recognized text fragment with its bounding quadrilateral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Vertices in engine order; the first is treated as top-left.
    pub polygon: [Point; 4],
    pub text: String,
    /// Recognition confidence (0.0–1.0).
    pub confidence: f32,
}

impl Detection {
    pub fn new(polygon: [Point; 4], text: impl Into<String>, confidence: f32) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Build a detection from raw `[x, y]` vertices as emitted by the engine.
    pub fn from_vertices(
        vertices: &[[f64; 2]],
        text: impl Into<String>,
        confidence: f32,
    ) -> Result<Self, OcrError> {
        let text = text.into();
        let polygon: [Point; 4] = match vertices {
            [a, b, c, d] => [(*a).into(), (*b).into(), (*c).into(), (*d).into()],
            _ => {
                return Err(OcrError::MalformedDetection(format!(
                    "expected 4 vertices for '{text}', got {}",
                    vertices.len()
                )))
            }
        };
        if polygon.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(OcrError::MalformedDetection(format!(
                "non-finite coordinate for '{text}'"
            )));
        }
        Ok(Self::new(polygon, text, confidence))
    }

    pub fn top_left(&self) -> Point {
        self.polygon[0]
    }
}

/// Detections sharing one horizontal band, ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub detections: Vec<Detection>,
}

impl Line {
    pub fn to_record(&self) -> LineRecord {
        LineRecord::from_parts(self.detections.iter().map(|d| d.text.clone()).collect())
    }
}

// ── Engine output shapes ─────────────────────────────────────────────────────

/// Page in the structured shape: parallel `rec_*` lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredPage {
    pub rec_texts: Vec<String>,
    pub rec_polys: Vec<Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec_scores: Option<Vec<f32>>,
}

/// `[polygon, [text, confidence]]`
pub type FlatDetection = (Vec<[f64; 2]>, (String, f32));

/// One page of engine output, in either accepted serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OcrPage {
    Structured(StructuredPage),
    /// `null` pages carry no detections.
    Flat(Option<Vec<FlatDetection>>),
}
