use std::collections::HashSet;

/// Company suffixes that end a merchant name.
pub const DEFAULT_SUFFIX_STOP_WORDS: &[&str] = &[
    "PTE", "PTE.", "LTD", "LTD.", "PTY", "CO", "CO.", "LLC", "CORP", "CORPORATION", "SINGAPORE",
    "SG",
];

/// Reduces a raw payee string to a bare merchant or person name.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    stop_words: HashSet<String>,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIX_STOP_WORDS.iter().copied())
    }
}

impl NameNormalizer {
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|s| s.as_ref().trim().to_uppercase())
                .collect(),
        }
    }

    /// `"ABC PTE LTD"` → `"ABC"`, `"WWW.EXAMPLE.COM"` → `"EXAMPLE"`.
    ///
    /// Uppercases, splits on whitespace and commas, drops a leading `WWW`,
    /// cuts each token at its first dot and stops at the first suffix word.
    pub fn normalize(&self, raw: &str) -> String {
        let upper = raw.trim().to_uppercase();
        let mut kept: Vec<&str> = Vec::new();

        for token in upper.split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            let mut token = token;
            if kept.is_empty() {
                if token == "WWW" {
                    continue;
                }
                if let Some(rest) = token.strip_prefix("WWW.") {
                    token = rest;
                }
            }
            let token = token.split('.').next().unwrap_or_default();
            if token.is_empty() {
                continue;
            }
            if self.stop_words.contains(token) {
                break;
            }
            kept.push(token);
        }

        kept.join(" ")
    }
}
