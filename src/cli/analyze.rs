use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;

use crate::config::Config;
use crate::metrics::ArticleMetrics;
use crate::pipeline::report::{render_summary, Check, Expectations};
use crate::pipeline::ArticleRequest;

#[derive(Debug, Serialize)]
pub struct Analysis {
    pub metrics: ArticleMetrics,
    pub checks: Vec<Check>,
}

/// Measure `article` with the checks the workflow applies after generation.
/// A `brand` name replaces the configured brand and its match term.
pub fn analyze_article(
    article: &str,
    request: &ArticleRequest,
    brand: Option<&str>,
    config: &Config,
) -> Analysis {
    let mut brand_config = config.brand.clone();
    if let Some(name) = brand {
        brand_config.name = name.to_string();
        brand_config.match_term = None;
    }

    let expectations = Expectations::from_request(request, &brand_config, &config.generation);
    let metrics = expectations.measure(article);
    let checks = expectations.evaluate(&metrics);
    Analysis { metrics, checks }
}

/// Measure an existing article against the same rules the workflow uses
#[allow(clippy::too_many_arguments)]
pub fn run(
    article_path: String,
    keyword: String,
    lsi: Vec<String>,
    url: Option<String>,
    brand: Option<String>,
    target_words: usize,
    config_path: Option<String>,
    json: bool,
) -> Result<()> {
    let config = Config::load_with_path(config_path)?;
    let article = fs::read_to_string(&article_path)
        .with_context(|| format!("Failed to read article {}", article_path))?;

    let mut request = ArticleRequest::new(&keyword, url.as_deref().unwrap_or_default());
    request.lsi_keywords = lsi;
    request.target_word_count = target_words;

    let analysis = analyze_article(&article, &request, brand.as_deref(), &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        if let Some(ref title) = analysis.metrics.title {
            println!("Title: {}\n", title);
        }
        print!(
            "{}",
            render_summary(&analysis.metrics, &analysis.checks, false)
        );
    }

    Ok(())
}
