//! Review prompt composition

use crate::history::ReviewRecord;

/// System instruction sent with every review request
pub const SYSTEM_PROMPT: &str = "You are an expert code reviewer. Provide constructive, specific feedback on code quality, potential bugs, performance issues, and best practices.";

/// Number of most recent reviews summarized into the context hint
pub const CONTEXT_ENTRIES: usize = 3;

/// Characters kept from each summarized review
pub const CONTEXT_PREFIX_CHARS: usize = 100;

const INSTRUCTIONS: &str = "Provide:
1. Overall assessment
2. Specific issues or bugs
3. Suggestions for improvement
4. Security concerns (if any)
5. Performance considerations";

/// Build the user prompt for a review.
///
/// Prompt size grows with `code` only; history contributes at most
/// `CONTEXT_ENTRIES` prefixes of `CONTEXT_PREFIX_CHARS` characters.
pub fn build(code: &str, language: Option<&str>, history: &[ReviewRecord]) -> String {
    let tag = language.filter(|l| !l.is_empty()).unwrap_or("");
    let subject = if tag.is_empty() { "code" } else { tag };

    let mut prompt = format!("Review this {} snippet:\n\n```{}\n{}\n```\n\n", subject, tag, code);

    if let Some(hint) = context_hint(history) {
        prompt.push_str(&format!(
            "\nBased on past reviews, focus on patterns you've identified before: {}\n\n",
            hint
        ));
    }

    prompt.push_str(INSTRUCTIONS);
    prompt
}

/// Join the review prefixes of the most recent entries, or `None` for an empty history
fn context_hint(history: &[ReviewRecord]) -> Option<String> {
    if history.is_empty() {
        return None;
    }

    let start = history.len().saturating_sub(CONTEXT_ENTRIES);
    let patterns: Vec<String> = history[start..]
        .iter()
        .map(|r| r.review.chars().take(CONTEXT_PREFIX_CHARS).collect())
        .collect();

    Some(patterns.join("; "))
}
