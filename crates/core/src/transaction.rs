use serde::{Deserialize, Serialize};

use super::category::Category;

/// One reconstructed statement line, as persisted in the raw artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    /// `parts` joined with single spaces.
    pub raw_text: String,
    /// Detection texts, left to right.
    pub parts: Vec<String>,
}

impl LineRecord {
    pub fn from_parts(parts: Vec<String>) -> Self {
        LineRecord {
            raw_text: parts.join(" "),
            parts,
        }
    }

    pub fn part(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(String::as_str)
    }
}

/// A ledger record after positional field extraction and name normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedTransaction {
    pub date: String,
    /// Marker category of the block this record came from (e.g. `paynow-transfer`).
    pub category: String,
    pub amount: String,
    pub company_person: String,
}

/// A cleaned record with its spending label attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    pub date: String,
    pub category: String,
    pub amount: String,
    pub company_person: String,
    pub llm_category: Category,
}

impl CategorizedTransaction {
    pub fn new(tx: CleanedTransaction, llm_category: Category) -> Self {
        CategorizedTransaction {
            date: tx.date,
            category: tx.category,
            amount: tx.amount,
            company_person: tx.company_person,
            llm_category,
        }
    }
}
