//! Prompt construction for CRO analysis.

/// Appended to page text that was cut at the character limit.
pub const TRUNCATION_MARKER: &str = "...";

/// Returns the first `max_chars` characters of `text` and whether anything
/// was cut. Counts Unicode scalar values, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Builds the analysis prompt around at most `max_chars` characters of page text.
pub fn build_prompt(page_text: &str, max_chars: usize) -> String {
    let (content, truncated) = truncate_chars(page_text, max_chars);
    let marker = if truncated { TRUNCATION_MARKER } else { "" };
    format!(
        "Analyze this e-commerce webpage content and generate a CRO (Conversion Rate Optimization) report:\n\
         \n\
         WEBPAGE CONTENT:\n\
         {content}{marker}\n\
         \n\
         Please provide a concise CRO analysis based on the content above. \
         Keep each field brief and focus on the changes most likely to raise conversions."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded(prompt: &str) -> &str {
        let start = prompt.find("WEBPAGE CONTENT:\n").unwrap() + "WEBPAGE CONTENT:\n".len();
        let end = prompt.find("\n\nPlease provide").unwrap();
        &prompt[start..end]
    }

    #[test]
    fn test_long_text_truncated_with_marker() {
        let text = "a".repeat(8000) + &"b".repeat(10);
        let prompt = build_prompt(&text, 8000);
        let body = embedded(&prompt);
        assert_eq!(body, format!("{}...", "a".repeat(8000)));
        assert!(!body.contains('b'));
    }

    #[test]
    fn test_exact_limit_not_marked() {
        let text = "a".repeat(8000);
        let prompt = build_prompt(&text, 8000);
        assert_eq!(embedded(&prompt), text);
    }

    #[test]
    fn test_short_text_embedded_verbatim() {
        let prompt = build_prompt("Free shipping over $50", 8000);
        assert_eq!(embedded(&prompt), "Free shipping over $50");
        assert!(prompt.contains("CRO (Conversion Rate Optimization)"));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(5);
        let (head, truncated) = truncate_chars(&text, 3);
        assert_eq!(head, "ééé");
        assert!(truncated);

        let (head, truncated) = truncate_chars(&text, 5);
        assert_eq!(head, text);
        assert!(!truncated);
    }
}
