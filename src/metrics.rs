//! Textual checks the workflow validates articles against.
//!
//! Everything here is plain counting: words are whitespace-separated tokens,
//! sentences are the pieces between runs of `.`, `!` and `?`, and keyword
//! matches are case-insensitive substrings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::util::truncate_chars;

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence regex is valid"));

/// Pieces this short are fragments ("e.g", "U.S") rather than sentences
pub const DEFAULT_MIN_SENTENCE_CHARS: usize = 10;

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Trimmed sentences longer than `min_chars` characters
pub fn sentences(text: &str, min_chars: usize) -> Vec<&str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.chars().count() > min_chars)
        .collect()
}

pub fn sentence_lengths(text: &str, min_chars: usize) -> Vec<usize> {
    sentences(text, min_chars)
        .into_iter()
        .map(word_count)
        .collect()
}

/// Mean words per kept sentence; `None` when the text has no sentences
pub fn mean_sentence_length(text: &str, min_chars: usize) -> Option<f64> {
    let lengths = sentence_lengths(text, min_chars);
    if lengths.is_empty() {
        return None;
    }
    Some(lengths.iter().sum::<usize>() as f64 / lengths.len() as f64)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Total words divided by kept sentences, rounded to one decimal
pub fn avg_words_per_sentence(text: &str, min_chars: usize) -> f64 {
    let count = sentences(text, min_chars).len();
    if count == 0 {
        return 0.0;
    }
    round1(word_count(text) as f64 / count as f64)
}

/// Case-insensitive, non-overlapping substring count
pub fn count_occurrences(text: &str, needle: &str) -> usize {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(needle.as_str()).count()
}

/// Occurrences of `keyword` per hundred words
pub fn keyword_density(text: &str, keyword: &str) -> f64 {
    let words = word_count(text);
    if words == 0 {
        return 0.0;
    }
    round2(count_occurrences(text, keyword) as f64 / words as f64 * 100.0)
}

pub fn title_has_keyword(text: &str, keyword: &str, window_chars: usize) -> bool {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return true;
    }
    truncate_chars(text, window_chars)
        .to_lowercase()
        .contains(&keyword)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BacklinkStatus {
    Present,
    NotFound,
}

impl fmt::Display for BacklinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BacklinkStatus::Present => write!(f, "Present"),
            BacklinkStatus::NotFound => write!(f, "Not Found"),
        }
    }
}

pub fn backlink_status(text: &str, url: &str) -> BacklinkStatus {
    if !url.trim().is_empty() && text.contains(url.trim()) {
        BacklinkStatus::Present
    } else {
        BacklinkStatus::NotFound
    }
}

/// Split a generated article into its title and body.
/// Accepts the `TITLE:` line the drafting prompt asks for, or a leading
/// markdown heading when the model ignores that format.
pub fn split_title(article: &str) -> (Option<String>, &str) {
    let trimmed = article.trim_start();
    let (first_line, rest) = match trimmed.find('\n') {
        Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
        None => (trimmed, ""),
    };
    let line = first_line.trim();

    let title = match line.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("title:") => Some(line[6..].trim()),
        _ => line.strip_prefix("# ").map(str::trim),
    };

    match title {
        Some(t) if !t.is_empty() => (Some(t.trim_matches('*').trim().to_string()), rest.trim_start()),
        _ => (None, trimmed),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub occurrences: usize,
    pub density: f64,
}

/// Inputs that decide what the metrics look for
#[derive(Debug, Clone)]
pub struct MetricTargets<'a> {
    pub primary_keyword: &'a str,
    pub lsi_keywords: &'a [String],
    pub backlink_url: &'a str,
    pub brand_term: &'a str,
    pub max_words_per_sentence: usize,
    pub min_sentence_chars: usize,
    pub title_window_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleMetrics {
    pub title: Option<String>,
    pub keyword_in_title: bool,
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_words_per_sentence: f64,
    /// Mean of per-sentence word counts; drives the readability check
    pub mean_sentence_words: f64,
    pub long_sentence_count: usize,
    pub keyword_occurrences: usize,
    pub keyword_density: f64,
    pub lsi_density: f64,
    pub lsi_breakdown: Vec<KeywordCount>,
    pub backlink_status: BacklinkStatus,
    pub brand_mentions: usize,
}

impl ArticleMetrics {
    pub fn compute(article: &str, targets: &MetricTargets<'_>) -> Self {
        let words = word_count(article);
        let lengths = sentence_lengths(article, targets.min_sentence_chars);

        let lsi_breakdown: Vec<KeywordCount> = targets
            .lsi_keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| KeywordCount {
                keyword: k.clone(),
                occurrences: count_occurrences(article, k),
                density: keyword_density(article, k),
            })
            .collect();

        let lsi_total: usize = lsi_breakdown.iter().map(|k| k.occurrences).sum();
        let lsi_density = if words == 0 {
            0.0
        } else {
            round2(lsi_total as f64 / words as f64 * 100.0)
        };

        Self {
            title: split_title(article).0,
            keyword_in_title: title_has_keyword(
                article,
                targets.primary_keyword,
                targets.title_window_chars,
            ),
            word_count: words,
            sentence_count: lengths.len(),
            avg_words_per_sentence: avg_words_per_sentence(article, targets.min_sentence_chars),
            mean_sentence_words: mean_sentence_length(article, targets.min_sentence_chars)
                .map(round1)
                .unwrap_or(0.0),
            long_sentence_count: lengths
                .iter()
                .filter(|&&n| n > targets.max_words_per_sentence)
                .count(),
            keyword_occurrences: count_occurrences(article, targets.primary_keyword),
            keyword_density: keyword_density(article, targets.primary_keyword),
            lsi_density,
            lsi_breakdown,
            backlink_status: backlink_status(article, targets.backlink_url),
            brand_mentions: count_occurrences(article, targets.brand_term),
        }
    }
}
