use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed label set every categorization resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Travel,
    Transport,
    Dining,
    Shopping,
    Insurance,
    Utilities,
    /// Person names and anything without a reasonable business guess.
    Misc,
    /// Bank-generated movements: interest, fees, charges, transfers.
    Ignore,
}

impl Category {
    /// All labels in prompt order.
    pub const ALL: [Category; 8] = [
        Category::Travel,
        Category::Transport,
        Category::Dining,
        Category::Shopping,
        Category::Insurance,
        Category::Utilities,
        Category::Misc,
        Category::Ignore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Travel => "travel",
            Category::Transport => "transport",
            Category::Dining => "dining",
            Category::Shopping => "shopping",
            Category::Insurance => "insurance",
            Category::Utilities => "utilities",
            Category::Misc => "misc",
            Category::Ignore => "ignore",
        }
    }

    /// Every label except the `misc` fallback, in prompt order.
    pub fn decisive() -> impl Iterator<Item = Category> {
        Self::ALL.into_iter().filter(|c| *c != Category::Misc)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "travel" => Ok(Category::Travel),
            "transport" => Ok(Category::Transport),
            "dining" => Ok(Category::Dining),
            "shopping" => Ok(Category::Shopping),
            "insurance" => Ok(Category::Insurance),
            "utilities" => Ok(Category::Utilities),
            "misc" => Ok(Category::Misc),
            "ignore" => Ok(Category::Ignore),
            other => Err(format!("Unknown category: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display_matches_label() {
        assert_eq!(Category::Dining.to_string(), "dining");
        assert_eq!(Category::Ignore.to_string(), "ignore");
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!(Category::from_str("Transport").unwrap(), Category::Transport);
        assert_eq!(Category::from_str(" UTILITIES ").unwrap(), Category::Utilities);
        assert!(Category::from_str("others").is_err());
    }

    #[test]
    fn decisive_excludes_misc() {
        let labels: Vec<_> = Category::decisive().collect();
        assert_eq!(labels.len(), 7);
        assert!(!labels.contains(&Category::Misc));
        assert_eq!(labels[0], Category::Travel);
    }

    #[test]
    fn serde_uses_lowercase_labels() {
        let json = serde_json::to_string(&Category::Shopping).unwrap();
        assert_eq!(json, "\"shopping\"");
        let back: Category = serde_json::from_str("\"insurance\"").unwrap();
        assert_eq!(back, Category::Insurance);
    }
}
