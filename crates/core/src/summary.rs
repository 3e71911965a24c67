use serde::Serialize;
use std::collections::BTreeMap;

use super::category::Category;
use super::money::Money;
use super::transaction::CategorizedTransaction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub count: usize,
    pub total: Money,
}

/// Spend totals per label for one categorized statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendSummary {
    /// One entry per label that occurred, in label order.
    pub totals: Vec<CategoryTotal>,
    /// Records whose amount string could not be read as money.
    pub unparsed: usize,
}

impl SpendSummary {
    pub fn from_transactions(transactions: &[CategorizedTransaction]) -> Self {
        let mut by_category: BTreeMap<Category, (usize, Money)> = BTreeMap::new();
        let mut unparsed = 0;

        for tx in transactions {
            let Some(amount) = Money::parse_statement_amount(&tx.amount) else {
                unparsed += 1;
                continue;
            };
            let entry = by_category
                .entry(tx.llm_category)
                .or_insert((0, Money::zero()));
            entry.0 += 1;
            entry.1 = entry.1 + amount;
        }

        let totals = by_category
            .into_iter()
            .map(|(category, (count, total))| CategoryTotal { category, count, total })
            .collect();

        SpendSummary { totals, unparsed }
    }

    /// Sum across every label except `ignore`.
    pub fn spend_total(&self) -> Money {
        self.totals
            .iter()
            .filter(|t| t.category != Category::Ignore)
            .fold(Money::zero(), |acc, t| acc + t.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: &str, llm_category: Category) -> CategorizedTransaction {
        CategorizedTransaction {
            date: "01 AUG".to_string(),
            category: "debit-nets".to_string(),
            amount: amount.to_string(),
            company_person: "SHOP".to_string(),
            llm_category,
        }
    }

    #[test]
    fn totals_grouped_in_label_order() {
        let summary = SpendSummary::from_transactions(&[
            tx("5.00", Category::Shopping),
            tx("3.50", Category::Dining),
            tx("1,000.00", Category::Shopping),
        ]);
        assert_eq!(summary.totals.len(), 2);
        assert_eq!(summary.totals[0].category, Category::Dining);
        assert_eq!(summary.totals[1].count, 2);
        assert_eq!(summary.totals[1].total, Money::from_cents(100500));
        assert_eq!(summary.unparsed, 0);
    }

    #[test]
    fn unparsed_amounts_are_counted_not_summed() {
        let summary = SpendSummary::from_transactions(&[
            tx("N/A", Category::Dining),
            tx("2.00", Category::Dining),
        ]);
        assert_eq!(summary.unparsed, 1);
        assert_eq!(summary.totals[0].total, Money::from_cents(200));
    }

    #[test]
    fn spend_total_excludes_ignore() {
        let summary = SpendSummary::from_transactions(&[
            tx("10.00", Category::Ignore),
            tx("4.00", Category::Transport),
        ]);
        assert_eq!(summary.spend_total(), Money::from_cents(400));
    }

    #[test]
    fn empty_input_is_empty_summary() {
        let summary = SpendSummary::from_transactions(&[]);
        assert!(summary.totals.is_empty());
        assert_eq!(summary.spend_total(), Money::zero());
    }
}
