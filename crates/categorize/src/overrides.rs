//! Merchant-specific categories that bypass the model, for names where the
//! model is reliably wrong (a logistics firm that sells uniforms, a person
//! whose name reads like a shop).

use std::collections::HashMap;

use serde::Deserialize;

use ledgerscan_core::Category;

#[derive(Debug, Clone, PartialEq)]
pub struct OverrideTable {
    entries: HashMap<String, Category>,
}

#[derive(Debug, Deserialize)]
struct OverrideFile {
    overrides: HashMap<String, Category>,
}

impl Default for OverrideTable {
    fn default() -> Self {
        Self::new([
            ("ST LOGISTICS", Category::Shopping),
            ("NUR ZANAH", Category::Misc),
            ("GRAB", Category::Transport),
            ("GRAB TRANSPORT", Category::Transport),
            ("COMFORT DELGRO", Category::Transport),
            ("GOJEK", Category::Transport),
            ("MCDONALD", Category::Dining),
            ("MCDONALDS", Category::Dining),
            ("KFC", Category::Dining),
            ("STARBUCKS", Category::Dining),
        ])
    }
}

impl OverrideTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Category)>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, category)| (normalize_key(name.as_ref()), category))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Expects an `[overrides]` table of `"MERCHANT" = "category"` pairs.
    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        let file: OverrideFile =
            toml::from_str(toml_content).map_err(|e| format!("Failed to parse TOML: {e}"))?;
        Ok(Self::new(file.overrides))
    }

    pub fn lookup(&self, merchant: &str) -> Option<Category> {
        self.entries.get(&normalize_key(merchant)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_key(name: &str) -> String {
    name.trim().to_uppercase()
}
