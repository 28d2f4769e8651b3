//! Shared utilities for the backlinker codebase

use std::fmt;

/// A string wrapper that masks its contents in Debug/Display output.
/// Prevents accidental logging of API keys and other secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Intentionally access the raw secret value (for headers, URLs, etc.)
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True for empty keys and the literal "none" used by keyless local gateways.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty() || self.0.eq_ignore_ascii_case("none")
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<&str> for SecretString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// First `max_chars` characters of `text`, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Unwrap model output that is one fenced block (```markdown ... ``` or ```...```).
/// Output that merely starts and ends with code samples is left alone.
pub fn strip_markdown_fences(content: &str) -> String {
    let trimmed = content.trim();

    let Some((opener, rest)) = trimmed.split_once('\n') else {
        return content.to_string();
    };
    let tag = match opener.trim().strip_prefix("```") {
        Some(tag) => tag.trim(),
        None => return content.to_string(),
    };
    if !matches!(tag, "" | "markdown" | "md" | "text") {
        return content.to_string();
    }

    match rest.strip_suffix("```") {
        Some(inner) if !inner.contains("```") => inner.trim().to_string(),
        _ => content.to_string(),
    }
}

/// Turn a keyword into a file-name friendly slug ("digital marketing" -> "digital_marketing").
pub fn keyword_slug(keyword: &str) -> String {
    let slug: String = keyword
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if slug.is_empty() {
        "article".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_hides_in_debug() {
        let secret = SecretString::new("sk-proj-123".to_string());
        let debug_output = format!("{:?}", secret);
        assert_eq!(debug_output, "***");
        assert!(!debug_output.contains("sk-proj"));
    }

    #[test]
    fn test_secret_string_hides_in_display() {
        let secret = SecretString::new("sk-proj-123".to_string());
        assert_eq!(format!("{}", secret), "***");
    }

    #[test]
    fn test_secret_string_expose_returns_value() {
        let secret: SecretString = "test-key".to_string().into();
        assert_eq!(secret.expose(), "test-key");
        assert!(secret == "test-key");
    }

    #[test]
    fn test_secret_string_blank() {
        assert!(SecretString::new(String::new()).is_blank());
        assert!(SecretString::new("NONE".to_string()).is_blank());
        assert!(!SecretString::new("key".to_string()).is_blank());
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_strip_markdown_fences() {
        assert_eq!(strip_markdown_fences("```markdown\n# Hi\n```"), "# Hi");
        assert_eq!(strip_markdown_fences("```\nTITLE: x\n```"), "TITLE: x");
        assert_eq!(strip_markdown_fences("plain text"), "plain text");
        assert_eq!(strip_markdown_fences("```"), "```");
    }

    #[test]
    fn test_strip_markdown_fences_keeps_code_samples() {
        let article = "```python\nprint('hi')\n```\n\nSome text.\n\n```bash\nls\n```";
        assert_eq!(strip_markdown_fences(article), article);

        let wrapped = "```md\nIntro.\n```\ncode\n```\nOutro.\n```";
        assert_eq!(strip_markdown_fences(wrapped), wrapped);

        let single = "```python\nprint('hi')\n```";
        assert_eq!(strip_markdown_fences(single), single);
    }

    #[test]
    fn test_keyword_slug() {
        assert_eq!(keyword_slug("digital marketing"), "digital_marketing");
        assert_eq!(keyword_slug("  "), "article");
        assert_eq!(keyword_slug("AI/ML tools"), "AI_ML_tools");
    }
}
