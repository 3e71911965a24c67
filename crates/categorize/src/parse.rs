use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use ledgerscan_core::Category;

fn re_bank_terms() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?i)\b(?:bank|interest|fees?|charges?|atm|transfer|loan|repayment)\b")
            .expect("invalid regex")
    })
}

const THINK_CLOSE: &str = "</think>";
const EDGE_PUNCTUATION: &[char] = &[' ', '.', ',', ':', ';', '"', '\''];

/// Resolve raw model output to a label. Never fails: output with no
/// recognizable label is `misc`.
///
/// A reasoning block closed by `</think>` is dropped. The last non-empty line
/// wins when it is exactly a decisive label; otherwise the first decisive
/// label, in label order, that appears anywhere in the remaining text is used.
pub fn parse_category(raw_response: &str) -> Category {
    let lowered = raw_response.trim().to_lowercase();
    let text = match lowered.split_once(THINK_CLOSE) {
        Some((_, answer)) => answer.trim(),
        None => lowered.as_str(),
    };

    if let Some(last) = text.lines().map(str::trim).rfind(|l| !l.is_empty()) {
        let token = last.trim_matches(EDGE_PUNCTUATION);
        if let Ok(category) = Category::from_str(token) {
            if category != Category::Misc {
                return category;
            }
        }
    }

    Category::decisive()
        .find(|c| text.contains(c.as_str()))
        .unwrap_or(Category::Misc)
}

/// The model leans on `ignore` for merchants it cannot place. Keep `ignore`
/// only when the merchant name itself reads as a bank movement.
pub fn demote_ignore(category: Category, merchant: &str) -> Category {
    if category == Category::Ignore && !re_bank_terms().is_match(merchant) {
        Category::Misc
    } else {
        category
    }
}
