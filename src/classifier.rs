//! Keyword-based priority classification
//!
//! Tiers are checked from most to least severe; the first tier with a
//! keyword contained in the lowercased text wins. Nothing matched means 1.

/// Lowest priority the classifier emits
pub const PRIORITY_MIN: u8 = 1;

/// Highest priority the classifier emits
pub const PRIORITY_MAX: u8 = 5;

/// Keyword tiers, most severe first
const PRIORITY_TIERS: [(u8, &[&str]); 4] = [
    (5, &["critical", "outage", "failure", "breach", "security"]),
    (4, &["error", "crash", "slow", "timeout"]),
    (3, &["bug", "issue", "problem"]),
    (2, &["request", "access", "minor"]),
];

/// Map an incident's text to a priority in `[PRIORITY_MIN, PRIORITY_MAX]`
pub fn classify_priority(description: &str, detailed_description: &str) -> u8 {
    let text = format!("{} {}", description, detailed_description).to_lowercase();

    PRIORITY_TIERS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(priority, _)| *priority)
        .unwrap_or(PRIORITY_MIN)
}
