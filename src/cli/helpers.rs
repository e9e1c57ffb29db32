//! Shared helper functions for CLI commands

/// Column width for product names in tables.
pub const NAME_WIDTH: usize = 30;

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Summarize a name list as "first + N more..." for table cells.
pub fn summarize_names(names: &[String]) -> String {
    match names {
        [] => "-".to_string(),
        [only] => only.clone(),
        [first, rest @ ..] => format!("{} + {} more...", first, rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        // Character-based, so accented names never split mid-byte
        assert_eq!(truncate_str("créme légère au chocolat", 10), "créme l...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_summarize_names() {
        assert_eq!(summarize_names(&[]), "-");
        assert_eq!(summarize_names(&["alpro".to_string()]), "alpro");
        assert_eq!(
            summarize_names(&["alpro".to_string(), "lu".to_string(), "belin".to_string()]),
            "alpro + 2 more..."
        );
    }
}
