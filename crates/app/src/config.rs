use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ledgerscan_categorize::{ErrorPolicy, OllamaConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use ledgerscan_ocr::{LineReconstructor, PagePolicy, DEFAULT_Y_THRESHOLD};

pub const ENV_BASE_URL: &str = "OLLAMA_BASE_URL";
pub const ENV_MODEL: &str = "OLLAMA_MODEL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSection,
    pub ocr: OcrSection,
    pub categorize: CategorizeSection,
    pub tables: TableSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSection {
    pub y_threshold: f64,
    pub skip_leading_pages: usize,
    pub end_marker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizeSection {
    /// Model calls in flight at once; 1 is strictly sequential.
    pub concurrency: usize,
    pub on_error: ErrorPolicy,
}

/// Optional TOML files replacing the built-in tables. Relative paths resolve
/// against the config file's directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSection {
    pub markers: Option<PathBuf>,
    pub overrides: Option<PathBuf>,
    pub schemas: Option<PathBuf>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 100,
            max_output_tokens: 64,
            temperature: 0.0,
        }
    }
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            y_threshold: DEFAULT_Y_THRESHOLD,
            skip_leading_pages: 0,
            end_marker: None,
        }
    }
}

impl Default for CategorizeSection {
    fn default() -> Self {
        Self {
            concurrency: 1,
            on_error: ErrorPolicy::Abort,
        }
    }
}

impl AppConfig {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let mut cfg: AppConfig =
            toml::from_str(&s).with_context(|| format!("parse config {}", path.display()))?;
        if let Some(dir) = path.parent() {
            cfg.tables.resolve_against(dir);
        }
        Ok(cfg)
    }

    /// Environment wins over the file for the model endpoint and name.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.llm.model = model;
        }
    }

    pub fn ollama(&self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.llm.base_url.clone(),
            model: self.llm.model.clone(),
            timeout: Duration::from_secs(self.llm.timeout_secs),
            max_output_tokens: self.llm.max_output_tokens,
            temperature: self.llm.temperature,
        }
    }

    pub fn page_policy(&self) -> PagePolicy {
        PagePolicy {
            skip_leading_pages: self.ocr.skip_leading_pages,
            end_marker: self.ocr.end_marker.clone(),
        }
    }

    pub fn reconstructor(&self) -> LineReconstructor {
        LineReconstructor::new(self.ocr.y_threshold)
    }
}

impl TableSection {
    fn resolve_against(&mut self, dir: &Path) {
        for path in [&mut self.markers, &mut self.overrides, &mut self.schemas]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}
