use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use super::request::{ArticleRequest, CompetitorArticle};
use crate::scrape::Scraper;

/// Source texts the drafting agent works from
#[derive(Debug, Clone, Default)]
pub struct SourceMaterial {
    pub original_content: String,
    /// In request order: inline competitors first, then scraped URLs.
    /// Failed scrapes stay in place with empty content.
    pub competitors: Vec<CompetitorArticle>,
}

impl SourceMaterial {
    pub fn competitor_texts(&self) -> Vec<&str> {
        self.competitors.iter().map(|c| c.content.as_str()).collect()
    }

    pub fn usable_competitors(&self) -> usize {
        self.competitors
            .iter()
            .filter(|c| !c.content.trim().is_empty())
            .count()
    }
}

/// Gathers the original article and competitor articles for a request
pub struct Collector<'a> {
    scraper: &'a Scraper,
}

impl<'a> Collector<'a> {
    pub fn new(scraper: &'a Scraper) -> Self {
        Self { scraper }
    }

    pub async fn collect(&self, request: &ArticleRequest) -> Result<SourceMaterial> {
        let original_content = match request.original_content() {
            Some(content) => content.to_string(),
            None => {
                info!(
                    "No article content supplied, scraping {}",
                    request.original_article_url
                );
                self.scraper
                    .scrape(&request.original_article_url)
                    .await
                    .context("Failed to fetch the original article")?
                    .content
            }
        };

        let mut competitors: Vec<CompetitorArticle> = request.competitors.clone();

        let urls: Vec<String> = request
            .competitor_urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();

        if !urls.is_empty() {
            info!("Scraping {} competitor article(s)...", urls.len());
        }
        for (url, result) in urls.iter().zip(self.scraper.scrape_many(&urls).await) {
            match result {
                Ok(article) => competitors.push(CompetitorArticle {
                    url: Some(article.url),
                    title: article.title,
                    content: article.content,
                }),
                Err(_) => competitors.push(CompetitorArticle {
                    url: Some(url.clone()),
                    ..CompetitorArticle::default()
                }),
            }
        }

        let material = SourceMaterial {
            original_content,
            competitors,
        };

        if material.original_content.trim().is_empty() {
            bail!("Main article content is empty");
        }
        if !material.competitors.is_empty() && material.usable_competitors() == 0 {
            warn!("No competitor content could be collected; drafting from the original only");
        }

        Ok(material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperConfig;

    #[tokio::test]
    async fn test_collect_inline_sources_without_network() {
        let scraper = Scraper::new(&ScraperConfig::default()).unwrap();
        let mut request = ArticleRequest::new("kw", "https://blog.example/post");
        request.original_article_content = Some("Original text".to_string());
        request.competitors = vec![CompetitorArticle {
            url: None,
            title: "Rival".to_string(),
            content: "Rival text".to_string(),
        }];

        let material = Collector::new(&scraper).collect(&request).await.unwrap();
        assert_eq!(material.original_content, "Original text");
        assert_eq!(material.competitor_texts(), vec!["Rival text"]);
        assert_eq!(material.usable_competitors(), 1);
    }

    #[tokio::test]
    async fn test_invalid_competitor_url_kept_as_empty_slot() {
        let scraper = Scraper::new(&ScraperConfig::default()).unwrap();
        let mut request = ArticleRequest::new("kw", "https://blog.example/post");
        request.original_article_content = Some("Original text".to_string());
        request.competitor_urls = vec!["not-a-url".to_string(), "  ".to_string()];

        let material = Collector::new(&scraper).collect(&request).await.unwrap();
        assert_eq!(material.competitors.len(), 1);
        assert_eq!(material.competitors[0].url.as_deref(), Some("not-a-url"));
        assert!(material.competitors[0].content.is_empty());
        assert_eq!(material.usable_competitors(), 0);
    }
}
