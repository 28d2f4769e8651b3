use anyhow::{bail, Result};
use tracing::warn;

use crate::config::Config;
use crate::scrape::{ScrapedArticle, Scraper};
use crate::util::truncate_chars;

/// Fetch each URL and print what the extractor pulled out.
/// `preview_chars` of zero prints the full content.
pub async fn run(
    urls: Vec<String>,
    config_path: Option<String>,
    json: bool,
    preview_chars: usize,
) -> Result<()> {
    let config = Config::load_with_path(config_path)?;
    let scraper = Scraper::new(&config.scraper)?;

    let mut articles: Vec<ScrapedArticle> = Vec::new();
    let mut failures = 0;
    for (url, result) in urls.iter().zip(scraper.scrape_many(&urls).await) {
        match result {
            Ok(article) => articles.push(article),
            Err(e) => {
                failures += 1;
                if !json {
                    println!("✗ {}: {}\n", url, e);
                }
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&articles)?);
    } else {
        for article in &articles {
            print_article(article, preview_chars);
        }
    }

    if failures > 0 {
        warn!("{} of {} URL(s) could not be scraped", failures, urls.len());
    }
    if articles.is_empty() {
        bail!("No content could be scraped");
    }
    Ok(())
}

fn print_article(article: &ScrapedArticle, preview_chars: usize) {
    println!("=== {} ===", article.url);
    if !article.title.is_empty() {
        println!("Title: {}", article.title);
    }
    println!("Words: {}\n", crate::metrics::word_count(&article.content));
    if preview_chars == 0 || article.content.chars().count() <= preview_chars {
        println!("{}\n", article.content);
    } else {
        println!("{}...\n", truncate_chars(&article.content, preview_chars));
    }
}
