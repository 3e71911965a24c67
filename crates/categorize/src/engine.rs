use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ledgerscan_core::{CategorizedTransaction, Category, CleanedTransaction};

use crate::overrides::OverrideTable;
use crate::parse::{demote_ignore, parse_category};
use crate::predictor::{LlmError, Predictor};
use crate::prompt::build_prompt;

/// What a batch does when the model cannot be reached for one transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop and return the error.
    #[default]
    Abort,
    /// Log, leave the transaction out, continue.
    Skip,
}

pub struct Categorizer<P: Predictor> {
    predictor: P,
    overrides: OverrideTable,
}

impl<P: Predictor> Categorizer<P> {
    pub fn new(predictor: P, overrides: OverrideTable) -> Self {
        Self { predictor, overrides }
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Label one merchant. Overrides win without consulting the model; a
    /// model that answers nonsense yields `misc`; a model that cannot be
    /// reached is an error.
    pub async fn categorize(
        &self,
        company_person: &str,
        description: Option<&str>,
    ) -> Result<Category, LlmError> {
        if let Some(category) = self.overrides.lookup(company_person) {
            debug!(merchant = company_person, %category, "using override");
            return Ok(category);
        }

        let prompt = build_prompt(company_person, description);
        let raw = self.predictor.predict(&prompt).await?;
        debug!(merchant = company_person, raw = %raw, "model response");

        Ok(parse_category(&raw))
    }

    /// `categorize` plus the ignore demotion, for one cleaned record.
    pub async fn categorize_transaction(
        &self,
        tx: &CleanedTransaction,
    ) -> Result<Category, LlmError> {
        let category = self.categorize(&tx.company_person, None).await?;
        let adjusted = demote_ignore(category, &tx.company_person);
        if adjusted != category {
            debug!(merchant = %tx.company_person, "demoted ignore to misc");
        }
        Ok(adjusted)
    }

    /// Categorize a batch with at most `concurrency` model calls in flight.
    /// Output keeps input order.
    pub async fn categorize_all(
        &self,
        transactions: Vec<CleanedTransaction>,
        concurrency: usize,
        policy: ErrorPolicy,
    ) -> Result<Vec<CategorizedTransaction>, LlmError> {
        let total = transactions.len();
        let mut results = stream::iter(transactions)
            .map(|tx| async move {
                let outcome = self.categorize_transaction(&tx).await;
                (tx, outcome)
            })
            .buffered(concurrency.max(1));

        let mut categorized = Vec::with_capacity(total);
        let mut skipped = 0usize;
        while let Some((tx, outcome)) = results.next().await {
            match outcome {
                Ok(category) => categorized.push(CategorizedTransaction::new(tx, category)),
                Err(e) if policy == ErrorPolicy::Skip => {
                    warn!(merchant = %tx.company_person, "Skipping transaction: {e}");
                    skipped += 1;
                }
                Err(e) => {
                    warn!(merchant = %tx.company_person, "Categorization aborted: {e}");
                    return Err(e);
                }
            }
        }

        info!(categorized = categorized.len(), skipped, "transactions categorized");
        Ok(categorized)
    }
}
