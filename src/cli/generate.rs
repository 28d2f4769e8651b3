use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::llm::factory;
use crate::pipeline::generator::ProgressFn;
use crate::pipeline::{ArticleRequest, ArticleWorkflow, Collector, Progress};
use crate::scrape::Scraper;
use crate::util::keyword_slug;

/// Output path used when `--output` is not given
pub fn default_output(primary_keyword: &str) -> String {
    format!("article_{}.txt", keyword_slug(primary_keyword))
}

fn print_progress(progress: &Progress) {
    println!("[{:>3}%] {}", progress.percent, progress.label);
}

#[allow(clippy::too_many_arguments)]
pub async fn run(
    request_path: String,
    output: Option<String>,
    report_path: Option<String>,
    config_path: Option<String>,
    provider_override: Option<String>,
    model_override: Option<String>,
    base_url_override: Option<String>,
    target_words_override: Option<usize>,
    dry_run: bool,
) -> Result<()> {
    info!("Request: {}", request_path);
    if let Some(ref cfg) = config_path {
        info!("Config: {}", cfg);
    }
    info!("Dry run: {}", dry_run);

    let mut config = Config::load_with_path(config_path)?;

    // Apply CLI overrides
    if let Some(ref provider) = provider_override {
        info!("CLI override: provider = {}", provider);
        config.llm.provider = provider.clone();
    }
    if let Some(ref model) = model_override {
        info!("CLI override: model = {}", model);
        config.llm.model = model.clone();
    }
    if let Some(ref base_url) = base_url_override {
        info!("CLI override: base_url = {}", base_url);
        config.llm.base_url = Some(base_url.clone());
    }

    let mut request = ArticleRequest::load(Path::new(&request_path))?;
    if let Some(words) = target_words_override {
        info!("CLI override: target_word_count = {}", words);
        request.target_word_count = words;
    }
    request.ensure_valid()?;

    // Fail on a bad provider or missing key before any scraping happens
    let client = factory::create_client(&config, dry_run)?;
    if dry_run {
        info!("Using mock LLM client");
    } else {
        info!("Using {} LLM provider ({})", config.llm.provider, config.llm.model);
    }

    let scraper = Scraper::new(&config.scraper)?;
    info!("Collecting source articles...");
    let sources = Collector::new(&scraper).collect(&request).await?;
    info!(
        "Original article: {} chars, {} usable competitor(s)",
        sources.original_content.len(),
        sources.usable_competitors()
    );

    let workflow = ArticleWorkflow::new(client)
        .with_generation_config(config.generation.clone())
        .with_prompts_config(config.prompts.clone())
        .with_brand(config.brand.clone());

    let progress: ProgressFn<'_> = &print_progress;
    let report = workflow.run(&request, &sources, Some(progress)).await?;

    let output = output.unwrap_or_else(|| default_output(&request.primary_keyword));
    fs::write(&output, &report.final_article)
        .with_context(|| format!("Failed to write article to {}", output))?;
    info!("✓ Article written to {}", output);

    if let Some(ref path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("Failed to write report to {}", path))?;
        info!("✓ Report written to {}", path);
    }

    println!();
    println!("{}", report.validation_summary);

    let failed = report.failed_checks();
    if !failed.is_empty() {
        warn!(
            "{} check(s) still need attention; review the article before publishing",
            failed.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_request(dir: &TempDir) -> String {
        let path = dir.path().join("request.toml");
        fs::write(
            &path,
            r#"primary_keyword = "data annotation tools"
lsi_keywords = ["image labeling", "training data"]
original_article_url = "https://example.com/annotation-guide"
original_article_content = "Teams label data to train models."
target_word_count = 300

[[competitors]]
content = "A competitor article about labeling."
"#,
        )
        .unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_default_output_name() {
        assert_eq!(
            default_output("data annotation tools"),
            "article_data_annotation_tools.txt"
        );
    }

    #[tokio::test]
    async fn test_dry_run_writes_article_and_report() {
        let dir = TempDir::new().unwrap();
        let request = write_request(&dir);
        let output = dir.path().join("out.txt");
        let report = dir.path().join("report.json");

        run(
            request,
            Some(output.to_string_lossy().to_string()),
            Some(report.to_string_lossy().to_string()),
            None,
            None,
            None,
            None,
            None,
            true,
        )
        .await
        .unwrap();

        let article = fs::read_to_string(&output).unwrap();
        assert!(article.starts_with("TITLE: Data Annotation Tools"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(json["metrics"]["backlink_status"], "Present");
        assert_eq!(json["steps"].as_array().unwrap().len(), 6);
        assert!(json["validation_summary"]
            .as_str()
            .unwrap()
            .contains("=== METRICS ==="));
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_before_generation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("request.toml");
        fs::write(&path, "primary_keyword = \"\"\n").unwrap();
        let output = dir.path().join("out.txt");

        let err = run(
            path.to_string_lossy().to_string(),
            Some(output.to_string_lossy().to_string()),
            None,
            None,
            None,
            None,
            None,
            None,
            true,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Primary keyword is required"));
        assert!(!output.exists());
    }
}
