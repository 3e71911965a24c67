use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ledgerscan_core::LineRecord;

/// A marker category and the keywords that open a record of that type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkerRule {
    pub category: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MarkerFile {
    marker: Vec<MarkerRule>,
}

/// Internal pairing of a category with its precompiled whole-word pattern.
#[derive(Debug)]
struct CompiledMarker {
    category: String,
    pattern: Regex,
}

/// Ordered category → keyword table; the first matching category wins.
#[derive(Debug)]
pub struct MarkerTable {
    markers: Vec<CompiledMarker>,
}

pub fn default_marker_rules() -> Vec<MarkerRule> {
    let rule = |category: &str, keywords: &[&str]| MarkerRule {
        category: category.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    };
    vec![
        rule("interest", &["interest earned", "interest credit", "interest"]),
        rule("paynow-transfer", &["paynow"]),
        rule("debit-nets", &["nets", "debit purchase", "debit card", "dr"]),
        rule("fund-transfer", &["fund transfer", "funds transfer"]),
        rule("bill-payment", &["bill payment", "giro"]),
        rule("credit-inward", &["inward credit", "salary", "cr"]),
    ]
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self::new(default_marker_rules()).expect("built-in marker table")
    }
}

impl MarkerTable {
    pub fn new(rules: Vec<MarkerRule>) -> Result<Self, regex::Error> {
        let mut markers = Vec::with_capacity(rules.len());
        for rule in rules {
            let alternatives: Vec<String> = rule
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .map(|k| regex::escape(&k))
                .collect();
            // A category without keywords can never open a block.
            if alternatives.is_empty() {
                continue;
            }
            let pattern = Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))?;
            markers.push(CompiledMarker { category: rule.category, pattern });
        }
        Ok(Self { markers })
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        let file: MarkerFile =
            toml::from_str(toml_content).map_err(|e| format!("Failed to parse TOML: {e}"))?;
        Self::new(file.marker).map_err(|e| format!("Invalid marker keyword: {e}"))
    }

    /// The marker category a line opens, if any. Matching is case-insensitive
    /// and on whole words only.
    pub fn classify(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.markers
            .iter()
            .find(|m| m.pattern.is_match(&text))
            .map(|m| m.category.as_str())
    }
}

/// One ledger record: a marker line followed by its continuation lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBlock {
    pub category: String,
    pub lines: Vec<LineRecord>,
}

/// Segment reading-order lines into transaction blocks.
///
/// A line matching a marker opens a new block; any other line continues the
/// most recent block, or is discarded if no block is open yet. A marker word
/// inside a continuation's free text also opens a block.
pub fn group_transactions<I>(table: &MarkerTable, lines: I) -> Vec<TransactionBlock>
where
    I: IntoIterator<Item = LineRecord>,
{
    let mut blocks: Vec<TransactionBlock> = Vec::new();
    let mut discarded = 0usize;

    for line in lines {
        if let Some(category) = table.classify(&line.raw_text) {
            blocks.push(TransactionBlock {
                category: category.to_string(),
                lines: vec![line],
            });
        } else if let Some(block) = blocks.last_mut() {
            block.lines.push(line);
        } else {
            discarded += 1;
        }
    }

    debug!(blocks = blocks.len(), discarded, "segmented transactions");
    blocks
}
