use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::from(cents) / Decimal::from(100))
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Parse a statement amount such as `1,234.56`, `$12.00` or `S$ 9.90`.
    /// A trailing `CR`/`DR` marker is ignored; the sign is not inferred from it.
    pub fn parse_statement_amount(s: &str) -> Option<Money> {
        let upper = s.trim().to_uppercase();
        let body = upper
            .strip_suffix("CR")
            .or_else(|| upper.strip_suffix("DR"))
            .unwrap_or(&upper);
        let clean: String = body
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        if clean.is_empty() || !clean.contains(|c: char| c.is_ascii_digit()) {
            return None;
        }
        Decimal::from_str(&clean).ok().map(Money::from_decimal)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}
