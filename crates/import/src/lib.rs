pub mod extract;
pub mod normalize;
pub mod segment;

pub use extract::{ExtractError, FieldSchema, FieldSchemaTable, TokenPosition, TransactionCleaner};
pub use normalize::{NameNormalizer, DEFAULT_SUFFIX_STOP_WORDS};
pub use segment::{
    default_marker_rules, group_transactions, MarkerRule, MarkerTable, TransactionBlock,
};

use ledgerscan_core::{CleanedTransaction, LineRecord};

/// Segment reconstructed lines and clean each resulting block.
pub fn clean_statement(
    lines: Vec<LineRecord>,
    markers: &MarkerTable,
    cleaner: &TransactionCleaner,
) -> Vec<CleanedTransaction> {
    let blocks = group_transactions(markers, lines);
    cleaner.clean_all(&blocks)
}
