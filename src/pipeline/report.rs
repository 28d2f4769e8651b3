//! Final metrics, pass/fail checks and the human-readable validation summary.

use serde::Serialize;
use std::fmt::Write as _;

use super::request::{ArticleRequest, DensityRange};
use super::StepRecord;
use crate::config::{BrandConfig, GenerationConfig};
use crate::metrics::{ArticleMetrics, BacklinkStatus, MetricTargets};

/// What a finished article is measured against
#[derive(Debug, Clone)]
pub struct Expectations {
    pub primary_keyword: String,
    pub lsi_keywords: Vec<String>,
    pub backlink_url: String,
    pub target_word_count: usize,
    pub keyword_density: DensityRange,
    pub lsi_density: DensityRange,
    pub max_words_per_sentence: usize,
    pub readability_band: (f64, f64),
    pub min_sentence_chars: usize,
    pub title_window_chars: usize,
    pub brand: BrandConfig,
}

impl Expectations {
    pub fn from_request(
        request: &ArticleRequest,
        brand: &BrandConfig,
        generation: &GenerationConfig,
    ) -> Self {
        Self {
            primary_keyword: request.primary_keyword.trim().to_string(),
            lsi_keywords: request.lsi_terms(),
            backlink_url: request.original_article_url.trim().to_string(),
            target_word_count: request.target_word_count,
            keyword_density: request.keyword_density,
            lsi_density: request.lsi_density,
            max_words_per_sentence: request.max_words_per_sentence,
            readability_band: (
                generation.min_avg_sentence_words,
                generation.max_avg_sentence_words,
            ),
            min_sentence_chars: generation.min_sentence_chars,
            title_window_chars: generation.title_window_chars,
            brand: brand.clone(),
        }
    }

    pub fn measure(&self, article: &str) -> ArticleMetrics {
        ArticleMetrics::compute(
            article,
            &MetricTargets {
                primary_keyword: &self.primary_keyword,
                lsi_keywords: &self.lsi_keywords,
                backlink_url: &self.backlink_url,
                brand_term: self.brand.match_term(),
                max_words_per_sentence: self.max_words_per_sentence,
                min_sentence_chars: self.min_sentence_chars,
                title_window_chars: self.title_window_chars,
            },
        )
    }

    /// One entry per rule, in summary order
    pub fn evaluate(&self, metrics: &ArticleMetrics) -> Vec<Check> {
        let (low, high) = self.readability_band;
        let readable = metrics.sentence_count > 0
            && metrics.mean_sentence_words >= low
            && metrics.mean_sentence_words <= high;

        vec![
            Check {
                name: "Title Validation",
                passed: metrics.keyword_in_title,
                detail: if metrics.keyword_in_title {
                    format!("\"{}\" found in title", self.primary_keyword)
                } else {
                    format!("\"{}\" missing from title", self.primary_keyword)
                },
            },
            Check {
                name: "Backlink Validation",
                passed: metrics.backlink_status == BacklinkStatus::Present,
                detail: metrics.backlink_status.to_string(),
            },
            Check {
                name: "Word Count",
                passed: metrics.word_count >= self.target_word_count,
                detail: format!("{} / {}+ target", metrics.word_count, self.target_word_count),
            },
            Check {
                name: "Readability",
                passed: readable,
                detail: format!(
                    "{:.1} words per sentence (band {:.0}-{:.0}), {} sentence(s) over {} words",
                    metrics.mean_sentence_words,
                    low,
                    high,
                    metrics.long_sentence_count,
                    self.max_words_per_sentence
                ),
            },
            Check {
                name: "Brand Mentions",
                passed: metrics.brand_mentions >= self.brand.mention_count,
                detail: format!(
                    "{} / {} \"{}\"",
                    metrics.brand_mentions, self.brand.mention_count, self.brand.name
                ),
            },
            Check {
                name: "Keyword Density",
                passed: self.keyword_density.contains(metrics.keyword_density),
                detail: format!(
                    "{:.2}% (target {:.1}-{:.1}%)",
                    metrics.keyword_density, self.keyword_density.min, self.keyword_density.max
                ),
            },
            Check {
                name: "LSI Density",
                passed: self.lsi_density.contains(metrics.lsi_density),
                detail: format!(
                    "{:.2}% (target {:.1}-{:.1}%)",
                    metrics.lsi_density, self.lsi_density.min, self.lsi_density.max
                ),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl Check {
    fn mark(&self) -> &'static str {
        if self.passed {
            "✅"
        } else {
            "⚠️"
        }
    }
}

/// The validation summary block shown after generation
pub fn render_summary(metrics: &ArticleMetrics, checks: &[Check], generated: bool) -> String {
    let mut out = String::from("=== VALIDATION SUMMARY ===\n\n");
    if generated {
        out.push_str("✅ Content Generation: Complete\n");
    }
    for check in checks {
        let _ = writeln!(out, "{} {}: {}", check.mark(), check.name, check.detail);
    }

    out.push_str("\n=== METRICS ===\n");
    let _ = writeln!(out, "- Words: {}", metrics.word_count);
    let _ = writeln!(out, "- Sentences: {}", metrics.sentence_count);
    let _ = writeln!(out, "- Avg Words/Sentence: {:.1}", metrics.avg_words_per_sentence);
    let _ = writeln!(out, "- Keyword Density: {:.2}%", metrics.keyword_density);
    let _ = writeln!(out, "- LSI Density: {:.2}%", metrics.lsi_density);
    for lsi in &metrics.lsi_breakdown {
        let _ = writeln!(
            out,
            "  - {}: {} ({:.2}%)",
            lsi.keyword, lsi.occurrences, lsi.density
        );
    }
    let _ = writeln!(out, "- Backlink: {}", metrics.backlink_status);
    let _ = writeln!(out, "- Brand Mentions: {}", metrics.brand_mentions);
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub final_article: String,
    pub metrics: ArticleMetrics,
    pub checks: Vec<Check>,
    pub steps: Vec<StepRecord>,
    pub validation_summary: String,
}

impl GenerationReport {
    pub fn build(article: String, expectations: &Expectations, steps: Vec<StepRecord>) -> Self {
        let metrics = expectations.measure(&article);
        let checks = expectations.evaluate(&metrics);
        let validation_summary = render_summary(&metrics, &checks, true);
        Self {
            final_article: article,
            metrics,
            checks,
            steps,
            validation_summary,
        }
    }

    pub fn all_checks_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> Vec<&Check> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }
}
