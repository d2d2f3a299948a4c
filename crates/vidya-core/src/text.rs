/// Truncate to at most `max` characters on a char boundary.
///
/// Length caps are measured in characters, not bytes, so Devanagari text
/// is never split mid-codepoint.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorter_input_untouched() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }

    #[test]
    fn ascii_truncated_at_count() {
        assert_eq!(truncate_chars("abcdef", 4), "abcd");
    }

    #[test]
    fn devanagari_counted_per_char() {
        let s = "नमस्ते दुनिया";
        let cut = truncate_chars(s, 6);
        assert_eq!(cut.chars().count(), 6);
        assert!(s.starts_with(cut));
    }
}
