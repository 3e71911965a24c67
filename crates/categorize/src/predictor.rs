use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("LLM service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("LLM response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A text-in, text-out language model.
///
/// Transport failures are errors; nonsensical output is not, since the
/// caller resolves it.
pub trait Predictor: Send + Sync {
    fn predict(&self, prompt: &str) -> impl Future<Output = Result<String, LlmError>> + Send;
}

// ── Mock predictor (always available, used for tests) ────────────────────────

/// Returns a preset response and counts how often it was asked.
pub struct MockPredictor {
    pub response: String,
    calls: AtomicUsize,
}

impl MockPredictor {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Predictor for MockPredictor {
    async fn predict(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}
