pub mod lines;
pub mod pages;
pub mod pipeline;
pub mod recognizer;
pub mod types;

pub use lines::{LineReconstructor, DEFAULT_Y_THRESHOLD};
pub use pages::{flatten_pages, PagePolicy};
pub use pipeline::{PipelineError, StatementPipeline, StatementScan};
pub use recognizer::{JsonDumpRecognizer, MockRecognizer, OcrBackend, OcrError};
pub use types::{Detection, Line, OcrPage, Point, StructuredPage};
