use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Label that introduces the actual-duration line in the PR template.
pub const DURATION_LABEL: &str = "実際にかかった時間";

/// `<label>[:：] [newline] [-*] [約] xx 時間`, capturing everything up to the qualifier.
static DURATION_LINE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"({}\s*[:：]?\s*\r?\n?\s*[-*]?\s*)(?:約\s*)?(?i:xx)\s*{}",
        regex::escape(DURATION_LABEL),
        regex::escape(crate::hours::HOURS_LABEL),
    );
    Regex::new(&pattern).expect("duration placeholder pattern is valid")
});

/// True if the body contains any of the configured patterns verbatim.
pub fn has_placeholder(body: &str, patterns: &[String]) -> bool {
    !body.is_empty() && patterns.iter().any(|pattern| body.contains(pattern.as_str()))
}

/// Replace every `xx 時間` placeholder that follows the duration label.
///
/// The label, separator and list bullet are kept as they were. A body without
/// a matching line comes back unchanged.
pub fn replace_placeholder(body: &str, formatted: &str) -> String {
    DURATION_LINE
        .replace_all(body, |caps: &Captures| format!("{}{}", &caps[1], formatted))
        .into_owned()
}
