//! Detects "I don't know"-style answers so they get a supportive evaluation
//! instead of a harsh score.

use once_cell::sync::Lazy;
use regex::RegexSet;

static UNSURE_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)\bi\s*don['’]?t\s*know\b",
        r"(?i)\bdo\s*not\s*know\b",
        r"(?i)\bnot\s*sure\b",
        r"(?i)\bno\s*idea\b",
        r"(?i)\bi['’]?m\s*not\s*sure\b",
        r"(?i)\bunsure\b",
        r"(?i)\bidk\b",
        r"(?i)\bpass\b",
    ])
    .expect("unsure-answer patterns are valid regexes")
});

/// True when the answer admits not knowing (or passes on the question).
pub fn is_unsure_answer(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    UNSURE_PATTERNS.is_match(text)
}
