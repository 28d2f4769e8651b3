use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use super::collector::SourceMaterial;
use super::report::{Expectations, GenerationReport};
use super::request::ArticleRequest;
use crate::config::{BrandConfig, GenerationConfig, PromptsConfig};
use crate::llm::client::LlmClient;
use crate::llm::prompts::{self, DraftContext};
use crate::metrics::{
    backlink_status, count_occurrences, mean_sentence_length, title_has_keyword, word_count,
    BacklinkStatus,
};
use crate::util::strip_markdown_fences;

/// The six agents, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Draft,
    Title,
    Backlink,
    WordCount,
    Readability,
    BrandMentions,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Draft,
        Step::Title,
        Step::Backlink,
        Step::WordCount,
        Step::Readability,
        Step::BrandMentions,
    ];

    pub fn number(&self) -> usize {
        match self {
            Step::Draft => 1,
            Step::Title => 2,
            Step::Backlink => 3,
            Step::WordCount => 4,
            Step::Readability => 5,
            Step::BrandMentions => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::Draft => "Creating Draft",
            Step::Title => "Fixing Title",
            Step::Backlink => "Adding Backlink",
            Step::WordCount => "Checking Word Count",
            Step::Readability => "Optimizing Readability",
            Step::BrandMentions => "Adding Brand Mentions",
        }
    }

    pub fn percent(&self) -> u8 {
        match self {
            Step::Draft => 20,
            Step::Title => 35,
            Step::Backlink => 50,
            Step::WordCount => 65,
            Step::Readability => 80,
            Step::BrandMentions => 95,
        }
    }

    fn detail(&self) -> &'static str {
        match self {
            Step::Draft => "Writing the first version from the original and competitor articles",
            Step::Title => "Making sure the primary keyword is in the title",
            Step::Backlink => "Linking back to the original article",
            Step::WordCount => "Expanding the article to the target length",
            Step::Readability => "Bringing sentence length into range",
            Step::BrandMentions => "Adding natural brand mentions",
        }
    }

    pub fn label(&self) -> String {
        format!("Step {}/{}: {}...", self.number(), Step::ALL.len(), self.name())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub label: String,
    pub percent: u8,
    pub detail: String,
}

impl Progress {
    fn step(step: Step) -> Self {
        Self {
            label: step.label(),
            percent: step.percent(),
            detail: step.detail().to_string(),
        }
    }

    fn complete() -> Self {
        Self {
            label: "Complete!".to_string(),
            percent: 100,
            detail: "Article generation finished".to_string(),
        }
    }
}

pub type ProgressFn<'a> = &'a (dyn Fn(&Progress) + Send + Sync);

/// One line of the agent log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: Step,
    pub revised: bool,
    pub note: String,
}

pub struct ArticleWorkflow {
    client: Box<dyn LlmClient>,
    generation: GenerationConfig,
    prompts: PromptsConfig,
    brand: BrandConfig,
}

impl ArticleWorkflow {
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self {
            client,
            generation: GenerationConfig::default(),
            prompts: PromptsConfig::default(),
            brand: BrandConfig::default(),
        }
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation = config;
        self
    }

    pub fn with_prompts_config(mut self, config: PromptsConfig) -> Self {
        self.prompts = config;
        self
    }

    pub fn with_brand(mut self, brand: BrandConfig) -> Self {
        self.brand = brand;
        self
    }

    async fn ask(&self, step: Step, prompt: &str, temperature: f32) -> Result<String> {
        debug!("{} prompt: {} chars", step, prompt.len());
        let reply = self
            .client
            .complete(prompt, temperature)
            .await
            .with_context(|| format!("LLM generation failed during {}", step))?;
        Ok(strip_markdown_fences(&reply))
    }

    /// Replace `article` with the revision unless the model returned nothing
    async fn revise(
        &self,
        step: Step,
        article: &mut String,
        prompt: &str,
        temperature: f32,
    ) -> Result<bool> {
        let revised = self.ask(step, prompt, temperature).await?;
        if revised.trim().is_empty() {
            warn!("  ✗ {} returned an empty article, keeping the previous version", step);
            return Ok(false);
        }
        *article = revised;
        Ok(true)
    }

    pub async fn run(
        &self,
        request: &ArticleRequest,
        sources: &SourceMaterial,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<GenerationReport> {
        let report = |p: Progress| {
            if let Some(cb) = progress {
                cb(&p);
            }
        };

        let brand = request.brand.as_ref().unwrap_or(&self.brand);
        let keyword = request.primary_keyword.trim();
        let url = request.original_article_url.trim();
        let lsi = request.lsi_terms();
        let related = request.related_links();
        let temps = &self.generation.temperatures;
        let mut steps = Vec::with_capacity(Step::ALL.len());

        info!("Generating article for \"{}\"", keyword);

        // Step 1: draft
        report(Progress::step(Step::Draft));
        info!("{}", Step::Draft.label());
        let competitors = sources.competitor_texts();
        let ctx = DraftContext {
            primary_keyword: keyword,
            lsi_keywords: &lsi,
            original_content: &sources.original_content,
            original_url: url,
            competitors: &competitors,
            competitor_char_limit: self.generation.competitor_char_limit,
            related_links: &related,
            target_word_count: request.target_word_count,
            keyword_density: (request.keyword_density.min, request.keyword_density.max),
            brand_name: &brand.name,
            brand_link: &brand.link,
            brand_mentions: brand.mention_count,
        };
        let draft_prompt = prompts::draft_article(&ctx, self.prompts.draft_custom.as_deref());
        let mut article = self.ask(Step::Draft, &draft_prompt, temps.draft).await?;
        info!("  ✓ Draft: {} words", word_count(&article));
        steps.push(StepRecord {
            step: Step::Draft,
            revised: true,
            note: format!("{} words", word_count(&article)),
        });

        // Step 2: title
        report(Progress::step(Step::Title));
        info!("{}", Step::Title.label());
        let record = if title_has_keyword(&article, keyword, self.generation.title_window_chars) {
            info!("  ✓ Title already contains the keyword");
            StepRecord {
                step: Step::Title,
                revised: false,
                note: "keyword already in title".to_string(),
            }
        } else {
            let prompt = prompts::fix_title(
                &article,
                keyword,
                self.generation.title_fix_excerpt_chars,
                self.prompts.title_custom.as_deref(),
            );
            let revised = self.revise(Step::Title, &mut article, &prompt, temps.title).await?;
            StepRecord {
                step: Step::Title,
                revised,
                note: "keyword missing from title".to_string(),
            }
        };
        steps.push(record);

        // Step 3: backlink
        report(Progress::step(Step::Backlink));
        info!("{}", Step::Backlink.label());
        let record = if backlink_status(&article, url) == BacklinkStatus::Present {
            info!("  ✓ Backlink already present");
            StepRecord {
                step: Step::Backlink,
                revised: false,
                note: "link already present".to_string(),
            }
        } else {
            let prompt =
                prompts::add_backlink(&article, url, keyword, self.prompts.backlink_custom.as_deref());
            let revised = self
                .revise(Step::Backlink, &mut article, &prompt, temps.backlink)
                .await?;
            StepRecord {
                step: Step::Backlink,
                revised,
                note: format!("link to {} was missing", url),
            }
        };
        steps.push(record);

        // Step 4: word count
        report(Progress::step(Step::WordCount));
        info!("{}", Step::WordCount.label());
        let words = word_count(&article);
        let record = if words >= request.target_word_count {
            info!("  ✓ {} words (target {})", words, request.target_word_count);
            StepRecord {
                step: Step::WordCount,
                revised: false,
                note: format!("{} words", words),
            }
        } else {
            info!(
                "  → {} words, expanding to {}+",
                words, request.target_word_count
            );
            let prompt = prompts::expand_article(
                &article,
                words,
                request.target_word_count,
                self.prompts.expand_custom.as_deref(),
            );
            let revised = self
                .revise(Step::WordCount, &mut article, &prompt, temps.expand)
                .await?;
            StepRecord {
                step: Step::WordCount,
                revised,
                note: format!("{} -> {} words", words, word_count(&article)),
            }
        };
        steps.push(record);

        // Step 5: readability
        report(Progress::step(Step::Readability));
        info!("{}", Step::Readability.label());
        let (low, high) = (
            self.generation.min_avg_sentence_words,
            self.generation.max_avg_sentence_words,
        );
        let record = match mean_sentence_length(&article, self.generation.min_sentence_chars) {
            None => {
                warn!("  ✗ No sentences found, skipping readability");
                StepRecord {
                    step: Step::Readability,
                    revised: false,
                    note: "no sentences".to_string(),
                }
            }
            Some(mean) if mean >= low && mean <= high => {
                info!("  ✓ {:.1} words per sentence", mean);
                StepRecord {
                    step: Step::Readability,
                    revised: false,
                    note: format!("{:.1} words per sentence", mean),
                }
            }
            Some(mean) => {
                info!("  → {:.1} words per sentence, outside {}-{}", mean, low, high);
                let prompt = prompts::optimize_readability(
                    &article,
                    self.prompts.readability_custom.as_deref(),
                );
                let revised = self
                    .revise(Step::Readability, &mut article, &prompt, temps.readability)
                    .await?;
                StepRecord {
                    step: Step::Readability,
                    revised,
                    note: format!("{:.1} words per sentence", mean),
                }
            }
        };
        steps.push(record);

        // Step 6: brand mentions
        report(Progress::step(Step::BrandMentions));
        info!("{}", Step::BrandMentions.label());
        let mentions = count_occurrences(&article, brand.match_term());
        let record = if mentions >= brand.mention_count {
            info!("  ✓ {} brand mentions", mentions);
            StepRecord {
                step: Step::BrandMentions,
                revised: false,
                note: format!("{} mentions", mentions),
            }
        } else {
            info!(
                "  → {} of {} brand mentions, adding more",
                mentions, brand.mention_count
            );
            let prompt = prompts::add_brand_mentions(
                &article,
                &brand.name,
                &brand.link,
                mentions,
                brand.mention_count,
                self.prompts.brand_custom.as_deref(),
            );
            let revised = self
                .revise(Step::BrandMentions, &mut article, &prompt, temps.brand)
                .await?;
            StepRecord {
                step: Step::BrandMentions,
                revised,
                note: format!("{} of {} mentions", mentions, brand.mention_count),
            }
        };
        steps.push(record);

        let expectations = Expectations::from_request(request, brand, &self.generation);
        let result = GenerationReport::build(article, &expectations, steps);
        report(Progress::complete());
        info!(
            "Article complete: {} words, {} check(s) need attention",
            result.metrics.word_count,
            result.failed_checks().len()
        );
        Ok(result)
    }
}
