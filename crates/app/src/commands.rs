use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use ledgerscan_categorize::{Categorizer, OllamaClient, OverrideTable, Predictor};
use ledgerscan_core::{CategorizedTransaction, CleanedTransaction, LineRecord, SpendSummary};
use ledgerscan_import::{
    clean_statement, FieldSchemaTable, MarkerTable, NameNormalizer, TransactionCleaner,
};
use ledgerscan_ocr::{JsonDumpRecognizer, StatementPipeline};

use crate::config::AppConfig;

pub const RAW_ARTIFACT: &str = "raw.json";
pub const CLEANED_ARTIFACT: &str = "cleaned.json";
pub const CATEGORIZED_ARTIFACT: &str = "categorized.json";

/// Tables every stage reads, built-in or loaded from the configured files.
pub struct Tables {
    pub markers: MarkerTable,
    pub cleaner: TransactionCleaner,
    pub overrides: OverrideTable,
}

impl Tables {
    pub fn load(cfg: &AppConfig) -> Result<Self> {
        let markers = match &cfg.tables.markers {
            Some(p) => MarkerTable::from_toml(&read_text(p)?)
                .map_err(|e| anyhow!("{}: {e}", p.display()))?,
            None => MarkerTable::default(),
        };
        let schemas = match &cfg.tables.schemas {
            Some(p) => FieldSchemaTable::from_toml(&read_text(p)?)
                .map_err(|e| anyhow!("{}: {e}", p.display()))?,
            None => FieldSchemaTable::default(),
        };
        let overrides = match &cfg.tables.overrides {
            Some(p) => OverrideTable::from_toml(&read_text(p)?)
                .map_err(|e| anyhow!("{}: {e}", p.display()))?,
            None => OverrideTable::default(),
        };
        if overrides.is_empty() {
            info!("No merchant overrides; every merchant goes to the model");
        } else {
            debug!(overrides = overrides.len(), "merchant overrides loaded");
        }
        Ok(Self {
            markers,
            cleaner: TransactionCleaner::new(schemas, NameNormalizer::default()),
            overrides,
        })
    }
}

/// Output of a full run.
#[derive(Debug)]
pub struct RunReport {
    pub lines: usize,
    pub cleaned: usize,
    pub categorized: Vec<CategorizedTransaction>,
    pub summary: SpendSummary,
}

// ── Stages ────────────────────────────────────────────────────────────────────

/// OCR dump → reading-order lines.
pub async fn scan_statement(input: &Path, cfg: &AppConfig) -> Result<Vec<LineRecord>> {
    let pipeline = StatementPipeline::new(JsonDumpRecognizer)
        .with_policy(cfg.page_policy())
        .with_reconstructor(cfg.reconstructor());
    let scan = pipeline
        .process_file(input)
        .await
        .with_context(|| format!("scan {}", input.display()))?;
    Ok(scan.lines)
}

/// Lines → cleaned transactions.
pub fn clean_lines(lines: Vec<LineRecord>, tables: &Tables) -> Vec<CleanedTransaction> {
    clean_statement(lines, &tables.markers, &tables.cleaner)
}

/// Cleaned transactions → categorized transactions, using `predictor` for
/// merchants without an override.
pub async fn categorize_with<P: Predictor>(
    predictor: P,
    transactions: Vec<CleanedTransaction>,
    tables: Tables,
    cfg: &AppConfig,
) -> Result<Vec<CategorizedTransaction>> {
    let categorizer = Categorizer::new(predictor, tables.overrides);
    categorizer
        .categorize_all(transactions, cfg.categorize.concurrency, cfg.categorize.on_error)
        .await
        .context("categorize transactions")
}

pub fn ollama_client(cfg: &AppConfig) -> Result<OllamaClient> {
    let client = OllamaClient::new(cfg.ollama()).context("build Ollama client")?;
    let ollama = client.config();
    info!("Using Ollama model '{}' at '{}'", ollama.model, ollama.base_url);
    Ok(client)
}

/// Every stage, writing each intermediate artifact into `out_dir`.
pub async fn run_with<P: Predictor>(
    predictor: P,
    input: &Path,
    out_dir: &Path,
    cfg: &AppConfig,
) -> Result<RunReport> {
    let tables = Tables::load(cfg)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create {}", out_dir.display()))?;

    let lines = scan_statement(input, cfg).await?;
    write_json(&out_dir.join(RAW_ARTIFACT), &lines)?;
    let line_count = lines.len();

    let cleaned = clean_lines(lines, &tables);
    write_json(&out_dir.join(CLEANED_ARTIFACT), &cleaned)?;
    let cleaned_count = cleaned.len();

    let categorized = categorize_with(predictor, cleaned, tables, cfg).await?;
    write_json(&out_dir.join(CATEGORIZED_ARTIFACT), &categorized)?;

    let summary = SpendSummary::from_transactions(&categorized);
    Ok(RunReport {
        lines: line_count,
        cleaned: cleaned_count,
        categorized,
        summary,
    })
}

// ── Artifacts ─────────────────────────────────────────────────────────────────

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let s = read_text(path)?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize artifact")?;
    std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    info!("Results written to {}", path.display());
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

pub fn default_output(input: &Path, name: &str) -> PathBuf {
    input.with_file_name(name)
}

pub fn render_summary(summary: &SpendSummary) -> String {
    let mut out = String::new();
    for t in &summary.totals {
        let total = t.total.to_string();
        out.push_str(&format!("{:<10} {:>4}  {:>12}\n", t.category.as_str(), t.count, total));
    }
    let spend = summary.spend_total().to_string();
    out.push_str(&format!("{:<10} {:>4}  {:>12}\n", "spend", "", spend));
    if summary.unparsed > 0 {
        out.push_str(&format!(
            "({} transactions with unreadable amounts)\n",
            summary.unparsed
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerscan_categorize::{ErrorPolicy, LlmError, MockPredictor};
    use ledgerscan_core::Category;

    struct Unreachable;

    impl Predictor for Unreachable {
        async fn predict(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Status { status: 503, body: "down".into() })
        }
    }

    fn quad(x: f64, y: f64) -> serde_json::Value {
        serde_json::json!([[x, y], [x + 40.0, y], [x + 40.0, y + 9.0], [x, y + 9.0]])
    }

    /// Two pages in the flat shape: a cover page and one ledger page.
    fn ocr_dump() -> serde_json::Value {
        serde_json::json!([
            [[quad(0.0, 10.0), ["STATEMENT OF ACCOUNT", 0.99]]],
            [
                [quad(0.0, 100.0), ["01 AUG", 0.99]],
                [quad(80.0, 102.0), ["PAYNOW TRANSFER", 0.98]],
                [quad(400.0, 101.0), ["25.00", 0.97]],
                [quad(80.0, 125.0), ["OTHR 889", 0.90]],
                [quad(80.0, 150.0), ["JUICY FRESH PTE LTD", 0.95]],
                [quad(0.0, 200.0), ["02 AUG", 0.99]],
                [quad(80.0, 200.0), ["NETS", 0.99]],
                [quad(400.0, 200.0), ["6.40", 0.99]],
                [quad(80.0, 225.0), ["GRAB", 0.99]],
                [quad(0.0, 300.0), ["31 AUG", 0.99]],
                [quad(80.0, 300.0), ["INTEREST EARNED", 0.99]],
                [quad(400.0, 300.0), ["0.12", 0.99]],
                [quad(0.0, 400.0), ["End of Transaction Details", 0.99]],
                [quad(0.0, 420.0), ["Page 2 of 2", 0.99]]
            ]
        ])
    }

    fn write_dump(dir: &Path) -> PathBuf {
        let path = dir.join("ocr.json");
        std::fs::write(&path, serde_json::to_vec(&ocr_dump()).unwrap()).unwrap();
        path
    }

    fn config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.ocr.skip_leading_pages = 1;
        cfg.ocr.end_marker = Some("end of transaction details".into());
        cfg
    }

    #[tokio::test]
    async fn run_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_dump(dir.path());
        let out_dir = dir.path().join("out");

        let predictor = MockPredictor::new("<think>juice</think>\ndining");
        let report = run_with(predictor, &input, &out_dir, &config()).await.unwrap();

        assert_eq!(report.lines, 6);
        assert_eq!(report.cleaned, 2);

        let raw: Vec<LineRecord> = read_json(&out_dir.join(RAW_ARTIFACT)).unwrap();
        assert_eq!(raw[0].raw_text, "01 AUG PAYNOW TRANSFER 25.00");

        let categorized: Vec<CategorizedTransaction> =
            read_json(&out_dir.join(CATEGORIZED_ARTIFACT)).unwrap();
        assert_eq!(categorized.len(), 2);
        assert_eq!(categorized[0].company_person, "JUICY FRESH");
        assert_eq!(categorized[0].llm_category, Category::Dining);
        assert_eq!(categorized[1].company_person, "GRAB");
        assert_eq!(categorized[1].llm_category, Category::Transport);

        assert_eq!(report.summary.spend_total().to_string(), "31.40");
    }

    #[tokio::test]
    async fn run_aborts_on_unreachable_model() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_dump(dir.path());
        let out_dir = dir.path().join("out");

        let err = run_with(Unreachable, &input, &out_dir, &config()).await.unwrap_err();
        assert!(format!("{err:#}").contains("503"));
        // Earlier stages still persisted their artifacts.
        assert!(out_dir.join(CLEANED_ARTIFACT).exists());
        assert!(!out_dir.join(CATEGORIZED_ARTIFACT).exists());
    }

    #[tokio::test]
    async fn run_skip_policy_keeps_override_hits() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_dump(dir.path());
        let mut cfg = config();
        cfg.categorize.on_error = ErrorPolicy::Skip;

        let report = run_with(Unreachable, &input, &dir.path().join("out"), &cfg).await.unwrap();
        assert_eq!(report.categorized.len(), 1);
        assert_eq!(report.categorized[0].company_person, "GRAB");
    }

    #[tokio::test]
    async fn unreadable_ocr_dump_yields_no_transactions() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ocr.json");
        std::fs::write(&input, "{\"pages\": 3}").unwrap();

        let out_dir = dir.path().join("out");
        let report = run_with(MockPredictor::new("dining"), &input, &out_dir, &config())
            .await
            .unwrap();
        assert_eq!(report.lines, 0);
        assert!(report.categorized.is_empty());
    }

    #[test]
    fn tables_load_from_configured_files() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = dir.path().join("overrides.toml");
        std::fs::write(&overrides, "[overrides]\n\"JUICY FRESH\" = \"shopping\"\n").unwrap();

        let mut cfg = AppConfig::default();
        cfg.tables.overrides = Some(overrides);
        let tables = Tables::load(&cfg).unwrap();
        assert_eq!(tables.overrides.lookup("juicy fresh"), Some(Category::Shopping));
        assert_eq!(tables.overrides.lookup("GRAB"), None);

        cfg.tables.markers = Some(dir.path().join("missing.toml"));
        assert!(Tables::load(&cfg).is_err());
    }

    #[test]
    fn ollama_client_follows_config() {
        let mut cfg = AppConfig::default();
        cfg.llm.model = "qwen2.5".into();
        cfg.llm.timeout_secs = 5;
        let client = ollama_client(&cfg).unwrap();
        assert_eq!(client.config().model, "qwen2.5");
        assert_eq!(client.config().timeout, std::time::Duration::from_secs(5));
    }

    #[test]
    fn summary_rendering_lists_labels() {
        let summary = SpendSummary::from_transactions(&[CategorizedTransaction {
            date: "01 AUG".into(),
            category: "debit-nets".into(),
            amount: "6.40".into(),
            company_person: "GRAB".into(),
            llm_category: Category::Transport,
        }]);
        let text = render_summary(&summary);
        assert!(text.contains("transport"));
        assert!(text.contains("6.40"));
        assert!(!text.contains("unreadable"));
    }
}
