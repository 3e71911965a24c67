pub mod engine;
pub mod ollama;
pub mod overrides;
pub mod parse;
pub mod predictor;
pub mod prompt;

pub use engine::{Categorizer, ErrorPolicy};
pub use ollama::{OllamaClient, OllamaConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use overrides::OverrideTable;
pub use parse::{demote_ignore, parse_category};
pub use predictor::{LlmError, MockPredictor, Predictor};
pub use prompt::build_prompt;
