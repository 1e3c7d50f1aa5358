//! String utilities for the domain layer.

/// Keep at most `max_chars` characters of `s`.
///
/// Counts characters, not bytes. No ellipsis is appended.
pub fn clip(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => s[..end].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_ascii() {
        assert_eq!(clip("hello", 10), "hello");
        assert_eq!(clip("hello world", 5), "hello");
        assert_eq!(clip("", 3), "");
    }

    #[test]
    fn test_clip_multibyte() {
        assert_eq!(clip("日本語テスト", 3), "日本語");
        assert_eq!(clip("héllo", 2), "hé");
    }
}
