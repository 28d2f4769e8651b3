//! The article request: everything the user fills in before generation.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BrandConfig;
use crate::scrape::validate_url;

pub const MIN_TARGET_WORDS: usize = 300;
pub const MAX_TARGET_WORDS: usize = 5000;
pub const MAX_LSI_KEYWORDS: usize = 10;
pub const MAX_RELATED_LINKS: usize = 10;

/// Inclusive percentage band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityRange {
    pub min: f64,
    pub max: f64,
}

impl DensityRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn problems(&self, label: &str, ceiling: f64) -> Vec<String> {
        let mut problems = Vec::new();
        for (which, value) in [("min", self.min), ("max", self.max)] {
            if !(0.0..=ceiling).contains(&value) {
                problems.push(format!(
                    "{} density {} must be between 0 and {} (got {})",
                    label, which, ceiling, value
                ));
            }
        }
        if self.min > self.max {
            problems.push(format!(
                "{} density min ({}) is greater than max ({})",
                label, self.min, self.max
            ));
        }
        problems
    }
}

/// A competitor supplied inline instead of (or as well as) by URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorArticle {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRequest {
    pub primary_keyword: String,
    #[serde(default)]
    pub lsi_keywords: Vec<String>,

    /// Where the user's article lives; becomes the backlink target
    #[serde(default)]
    pub original_article_url: String,
    #[serde(default)]
    pub original_article_content: Option<String>,
    /// Read into `original_article_content` by `load` when content is absent
    #[serde(default)]
    pub original_article_file: Option<PathBuf>,

    #[serde(default)]
    pub competitor_urls: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<CompetitorArticle>,
    #[serde(default)]
    pub related_links: Vec<String>,

    #[serde(default = "default_target_words")]
    pub target_word_count: usize,
    #[serde(default = "default_keyword_density")]
    pub keyword_density: DensityRange,
    #[serde(default = "default_lsi_density")]
    pub lsi_density: DensityRange,
    #[serde(default = "default_max_words_per_sentence")]
    pub max_words_per_sentence: usize,

    /// Overrides the brand from config for this article only
    #[serde(default)]
    pub brand: Option<BrandConfig>,
}

fn default_target_words() -> usize {
    1000
}

fn default_keyword_density() -> DensityRange {
    DensityRange::new(1.5, 3.0)
}

fn default_lsi_density() -> DensityRange {
    DensityRange::new(4.0, 6.0)
}

fn default_max_words_per_sentence() -> usize {
    13
}

impl ArticleRequest {
    pub fn new(primary_keyword: &str, original_article_url: &str) -> Self {
        Self {
            primary_keyword: primary_keyword.to_string(),
            lsi_keywords: Vec::new(),
            original_article_url: original_article_url.to_string(),
            original_article_content: None,
            original_article_file: None,
            competitor_urls: Vec::new(),
            competitors: Vec::new(),
            related_links: Vec::new(),
            target_word_count: default_target_words(),
            keyword_density: default_keyword_density(),
            lsi_density: default_lsi_density(),
            max_words_per_sentence: default_max_words_per_sentence(),
            brand: None,
        }
    }

    /// Parse a TOML request file. A relative `original_article_file` is
    /// resolved against the request file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?;
        let mut request: ArticleRequest = toml::from_str(&text)
            .with_context(|| format!("Invalid request file {}", path.display()))?;

        if request.original_content().is_none() {
            if let Some(ref file) = request.original_article_file {
                let resolved = if file.is_relative() {
                    path.parent().unwrap_or(Path::new(".")).join(file)
                } else {
                    file.clone()
                };
                let content = fs::read_to_string(&resolved).with_context(|| {
                    format!("Failed to read original article {}", resolved.display())
                })?;
                request.original_article_content = Some(content);
            }
        }
        Ok(request)
    }

    /// Inline original article text, if any was supplied
    pub fn original_content(&self) -> Option<&str> {
        self.original_article_content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }

    /// Non-blank LSI keywords, trimmed
    pub fn lsi_terms(&self) -> Vec<String> {
        self.lsi_keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn related_links(&self) -> Vec<String> {
        self.related_links
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Every problem with the request, in form order
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.primary_keyword.trim().is_empty() {
            errors.push("Primary keyword is required".to_string());
        }

        let lsi = self.lsi_terms();
        if lsi.is_empty() {
            errors.push("At least one LSI keyword is required".to_string());
        } else if lsi.len() > MAX_LSI_KEYWORDS {
            errors.push(format!(
                "At most {} LSI keywords are allowed (got {})",
                MAX_LSI_KEYWORDS,
                lsi.len()
            ));
        }

        let link = self.original_article_url.trim();
        if self.original_content().is_none() && link.is_empty() {
            errors.push("Main article content is required".to_string());
        }
        if link.is_empty() {
            errors.push("Main article link is required".to_string());
        } else if let Err(e) = validate_url(link) {
            errors.push(format!("Main article link is invalid: {}", e));
        }

        let related = self.related_links();
        if related.len() > MAX_RELATED_LINKS {
            errors.push(format!(
                "At most {} related links are allowed (got {})",
                MAX_RELATED_LINKS,
                related.len()
            ));
        }

        if !(MIN_TARGET_WORDS..=MAX_TARGET_WORDS).contains(&self.target_word_count) {
            errors.push(format!(
                "Target word count must be between {} and {} (got {})",
                MIN_TARGET_WORDS, MAX_TARGET_WORDS, self.target_word_count
            ));
        }

        errors.extend(self.keyword_density.problems("Keyword", 5.0));
        errors.extend(self.lsi_density.problems("LSI", 10.0));

        if !(5..=20).contains(&self.max_words_per_sentence) {
            errors.push(format!(
                "Max words per sentence must be between 5 and 20 (got {})",
                self.max_words_per_sentence
            ));
        }

        if let Some(ref brand) = self.brand {
            if brand.name.trim().is_empty() {
                errors.push("Brand name cannot be empty".to_string());
            }
        }

        errors
    }

    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let list: Vec<String> = errors.iter().map(|e| format!("- {}", e)).collect();
        bail!("Please fix the following errors:\n{}", list.join("\n"))
    }
}
