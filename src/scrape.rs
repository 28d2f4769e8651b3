//! Fetch articles over HTTP and pull their readable text out of the HTML.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::util::truncate_chars;

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));
static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("valid regex"));
static CONTAINER_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(content|article|post|entry)").expect("valid regex"));

static SEL_H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
static SEL_TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static SEL_ARTICLE: Lazy<Selector> = Lazy::new(|| selector("article"));
static SEL_MAIN: Lazy<Selector> = Lazy::new(|| selector("main"));
static SEL_DIV: Lazy<Selector> = Lazy::new(|| selector("div"));
static SEL_BODY: Lazy<Selector> = Lazy::new(|| selector("body"));
static SEL_TEXT: Lazy<Selector> =
    Lazy::new(|| selector("p, h1, h2, h3, h4, h5, h6, li, blockquote, pre"));

/// Elements whose text never belongs to the article body
const BOILERPLATE_TAGS: &[&str] = &["script", "style", "noscript", "nav", "header", "footer", "aside"];

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Empty URL provided")]
    EmptyUrl,

    #[error("Invalid URL: must start with http:// or https://. Got: '{0}'")]
    InvalidScheme(String),

    #[error("Invalid URL format: '{0}'")]
    InvalidFormat(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Could not extract content from the page")]
    NoContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedArticle {
    pub url: String,
    pub title: String,
    pub content: String,
}

/// Check the URL shape before touching the network. Returns the trimmed URL.
pub fn validate_url(url: &str) -> Result<&str, ScrapeError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ScrapeError::EmptyUrl);
    }
    let preview = || format!("{}...", truncate_chars(url, 50));
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| ScrapeError::InvalidScheme(preview()))?;
    if rest.is_empty() || url.chars().any(char::is_whitespace) {
        return Err(ScrapeError::InvalidFormat(preview()));
    }
    Ok(url)
}

/// Text of one element with internal whitespace collapsed
fn element_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_boilerplate(el: &ElementRef<'_>) -> bool {
    el.ancestors().any(|node| {
        node.value()
            .as_element()
            .map(|e| BOILERPLATE_TAGS.contains(&e.name()))
            .unwrap_or(false)
    })
}

fn clean_whitespace(text: &str) -> String {
    let text = BLANK_LINES.replace_all(text, "\n\n");
    SPACE_RUNS.replace_all(&text, " ").trim().to_string()
}

fn find_container(document: &Html) -> Option<ElementRef<'_>> {
    // Containers inside navigation, headers or sidebars are never the article
    let usable = |el: &ElementRef<'_>| {
        !BOILERPLATE_TAGS.contains(&el.value().name()) && !is_boilerplate(el)
    };
    if let Some(el) = document.select(&SEL_ARTICLE).find(usable) {
        return Some(el);
    }
    if let Some(el) = document.select(&SEL_MAIN).find(usable) {
        return Some(el);
    }
    let hinted = |attr: &str| {
        document.select(&SEL_DIV).find(|div| {
            usable(div)
                && div
                    .value()
                    .attr(attr)
                    .map(|v| CONTAINER_HINT.is_match(v))
                    .unwrap_or(false)
        })
    };
    hinted("class")
        .or_else(|| hinted("id"))
        .or_else(|| document.select(&SEL_BODY).next())
}

/// Title and body text of an HTML page.
/// Title comes from the first `<h1>`, else `<title>`.
pub fn extract_article(html: &str) -> (String, String) {
    let document = Html::parse_document(html);

    let title = document
        .select(&SEL_H1)
        .next()
        .or_else(|| document.select(&SEL_TITLE).next())
        .map(|el| clean_whitespace(&element_text(el)))
        .unwrap_or_default();

    let Some(container) = find_container(&document) else {
        return (title, String::new());
    };

    let pieces: Vec<String> = container
        .select(&SEL_TEXT)
        .filter(|el| !is_boilerplate(el))
        // Skip list items and paragraphs nested in another collected element
        .filter(|el| {
            !el.ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|a| a.id() != container.id())
                .any(|a| SEL_TEXT.matches(&a))
        })
        .map(|el| clean_whitespace(&element_text(el)))
        .filter(|t| !t.is_empty())
        .collect();

    (title, clean_whitespace(&pieces.join("\n\n")))
}

pub struct Scraper {
    client: Client,
    timeout_secs: u64,
}

impl Scraper {
    pub fn new(config: &ScraperConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    fn request_error(&self, e: reqwest::Error) -> ScrapeError {
        if e.is_timeout() {
            ScrapeError::Timeout(self.timeout_secs)
        } else {
            ScrapeError::Request(e)
        }
    }

    pub async fn scrape(&self, url: &str) -> Result<ScrapedArticle, ScrapeError> {
        let url = validate_url(url)?;
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await.map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            return Err(ScrapeError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await.map_err(|e| self.request_error(e))?;

        let (title, content) = extract_article(&html);
        if content.is_empty() {
            return Err(ScrapeError::NoContent);
        }

        info!(
            "Scraped {} ({} chars){}",
            url,
            content.len(),
            if title.is_empty() {
                String::new()
            } else {
                format!(": {}", title)
            }
        );

        Ok(ScrapedArticle {
            url: url.to_string(),
            title,
            content,
        })
    }

    /// Scrape each URL in order. Results line up with the input positions.
    pub async fn scrape_many(&self, urls: &[String]) -> Vec<Result<ScrapedArticle, ScrapeError>> {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            let result = self.scrape(url).await;
            if let Err(ref e) = result {
                warn!("Failed to scrape '{}': {}", url, e);
            }
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert_eq!(validate_url("  https://a.test/x ").unwrap(), "https://a.test/x");
        assert!(matches!(validate_url("   "), Err(ScrapeError::EmptyUrl)));
        assert!(matches!(
            validate_url("ftp://a.test"),
            Err(ScrapeError::InvalidScheme(_))
        ));
        assert!(matches!(
            validate_url("www.example.com"),
            Err(ScrapeError::InvalidScheme(_))
        ));
        assert!(matches!(
            validate_url("https://"),
            Err(ScrapeError::InvalidFormat(_))
        ));
        assert!(matches!(
            validate_url("https://a.test/with space"),
            Err(ScrapeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_invalid_scheme_message_is_truncated() {
        let long = format!("example.com/{}", "a".repeat(100));
        let msg = validate_url(&long).unwrap_err().to_string();
        assert!(msg.contains("must start with http:// or https://"));
        assert!(msg.len() < 140);
    }

    #[test]
    fn test_extract_prefers_article_and_skips_boilerplate() {
        let html = r#"<html><head><title>Page Title</title><style>p{}</style></head>
            <body>
              <header><p>Site header text</p></header>
              <nav><li>Home</li></nav>
              <article>
                <h1>Real   Title</h1>
                <p>First paragraph of the article.</p>
                <aside><p>Related posts</p></aside>
                <p>Second    paragraph.</p>
                <script>var x = 1;</script>
              </article>
              <footer><p>Copyright</p></footer>
            </body></html>"#;
        let (title, content) = extract_article(html);
        assert_eq!(title, "Real Title");
        assert_eq!(
            content,
            "Real Title\n\nFirst paragraph of the article.\n\nSecond paragraph."
        );
        assert!(!content.contains("Related posts"));
        assert!(!content.contains("Copyright"));
    }

    #[test]
    fn test_extract_uses_div_class_hint_then_title_tag() {
        let html = r#"<html><head><title>Fallback Title</title></head><body>
              <div class="sidebar"><p>Ignore me</p></div>
              <div class="Post-Content"><p>Body text here.</p><ul><li>Point one</li></ul></div>
            </body></html>"#;
        let (title, content) = extract_article(html);
        assert_eq!(title, "Fallback Title");
        assert_eq!(content, "Body text here.\n\nPoint one");
    }

    #[test]
    fn test_extract_uses_div_id_hint() {
        let html = r#"<html><body><div id="main-entry"><p>By id.</p></div><p>Outside.</p></body></html>"#;
        let (_, content) = extract_article(html);
        assert_eq!(content, "By id.");
    }

    #[test]
    fn test_extract_nested_elements_not_duplicated() {
        let html = r#"<html><body><main><ul><li><p>Nested item</p></li></ul></main></body></html>"#;
        let (_, content) = extract_article(html);
        assert_eq!(content, "Nested item");
    }

    #[test]
    fn test_extract_ignores_article_inside_aside() {
        let html = r#"<html><body>
              <aside><article><a>Related card</a></article></aside>
              <main><p>The real article body text lives here.</p></main>
            </body></html>"#;
        let (_, content) = extract_article(html);
        assert_eq!(content, "The real article body text lives here.");
    }

    #[test]
    fn test_extract_ignores_hinted_div_inside_footer() {
        let html = r#"<html><body>
              <footer><div class="post-links"><p>Older posts</p></div></footer>
              <div id="entry"><p>Body of the entry itself.</p></div>
            </body></html>"#;
        let (_, content) = extract_article(html);
        assert_eq!(content, "Body of the entry itself.");
    }

    #[test]
    fn test_extract_falls_back_to_body() {
        let html = "<html><body><p>Only body.</p></body></html>";
        let (title, content) = extract_article(html);
        assert_eq!(title, "");
        assert_eq!(content, "Only body.");
    }

    #[test]
    fn test_extract_empty_page() {
        let (_, content) = extract_article("<html><body><div></div></body></html>");
        assert!(content.is_empty());
    }
}
