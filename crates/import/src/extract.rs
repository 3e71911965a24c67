use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use ledgerscan_core::CleanedTransaction;

use crate::normalize::NameNormalizer;
use crate::segment::TransactionBlock;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("{category} block has no {field} at line {line}, token {token}")]
    MissingToken {
        category: String,
        field: &'static str,
        line: usize,
        token: usize,
    },
}

/// Where a field sits inside a block: line index, then token index within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPosition {
    pub line: usize,
    pub token: usize,
}

impl TokenPosition {
    pub const fn new(line: usize, token: usize) -> Self {
        Self { line, token }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub date: TokenPosition,
    pub amount: TokenPosition,
    pub company_person: TokenPosition,
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            date: TokenPosition::new(0, 0),
            amount: TokenPosition::new(0, 2),
            company_person: TokenPosition::new(2, 0),
        }
    }
}

/// Field positions keyed by marker category, plus the categories that are
/// not spend records at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchemaTable {
    #[serde(default)]
    pub default: FieldSchema,
    #[serde(default)]
    pub categories: HashMap<String, FieldSchema>,
    #[serde(default)]
    pub dropped: HashSet<String>,
}

impl Default for FieldSchemaTable {
    fn default() -> Self {
        let nets = FieldSchema {
            company_person: TokenPosition::new(1, 0),
            ..FieldSchema::default()
        };
        Self {
            default: FieldSchema::default(),
            categories: HashMap::from([("debit-nets".to_string(), nets)]),
            dropped: HashSet::from(["interest".to_string()]),
        }
    }
}

impl FieldSchemaTable {
    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        toml::from_str(toml_content).map_err(|e| format!("Failed to parse TOML: {e}"))
    }

    pub fn schema_for(&self, category: &str) -> &FieldSchema {
        self.categories.get(category).unwrap_or(&self.default)
    }

    pub fn is_dropped(&self, category: &str) -> bool {
        self.dropped.contains(category)
    }
}

/// Turns transaction blocks into cleaned records.
#[derive(Debug, Clone, Default)]
pub struct TransactionCleaner {
    pub schemas: FieldSchemaTable,
    pub normalizer: NameNormalizer,
}

impl TransactionCleaner {
    pub fn new(schemas: FieldSchemaTable, normalizer: NameNormalizer) -> Self {
        Self { schemas, normalizer }
    }

    /// `Ok(None)` for blocks of a dropped category (bank interest).
    pub fn clean(
        &self,
        block: &TransactionBlock,
    ) -> Result<Option<CleanedTransaction>, ExtractError> {
        if self.schemas.is_dropped(&block.category) {
            return Ok(None);
        }
        let schema = self.schemas.schema_for(&block.category);

        let date = token_at(block, schema.date, "date")?;
        let amount = token_at(block, schema.amount, "amount")?;
        let company_person = token_at(block, schema.company_person, "company/person")?;

        Ok(Some(CleanedTransaction {
            date: date.to_string(),
            category: block.category.clone(),
            amount: amount.to_string(),
            company_person: self.normalizer.normalize(company_person),
        }))
    }

    /// Clean every block independently; a block that fails extraction is
    /// logged and left out.
    pub fn clean_all(&self, blocks: &[TransactionBlock]) -> Vec<CleanedTransaction> {
        let mut cleaned = Vec::with_capacity(blocks.len());
        let mut dropped = 0usize;
        let mut failed = 0usize;

        for (index, block) in blocks.iter().enumerate() {
            match self.clean(block) {
                Ok(Some(tx)) => cleaned.push(tx),
                Ok(None) => {
                    debug!(index, category = %block.category, "skipping non-spend block");
                    dropped += 1;
                }
                Err(e) => {
                    warn!(index, "Dropping transaction: {e}");
                    failed += 1;
                }
            }
        }

        info!(cleaned = cleaned.len(), dropped, failed, "transactions cleaned");
        cleaned
    }
}

fn token_at<'a>(
    block: &'a TransactionBlock,
    pos: TokenPosition,
    field: &'static str,
) -> Result<&'a str, ExtractError> {
    block
        .lines
        .get(pos.line)
        .and_then(|line| line.part(pos.token))
        .ok_or_else(|| ExtractError::MissingToken {
            category: block.category.clone(),
            field,
            line: pos.line,
            token: pos.token,
        })
}
