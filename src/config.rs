use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::llm::Provider;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub brand: BrandConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    /// Environment variable holding the API key. Falls back to the provider's
    /// conventional variable (OPENAI_API_KEY, GOOGLE_API_KEY, GROQ_API_KEY).
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>, // For OpenAI-compatible APIs

    /// Optional: Override max_tokens for LLM requests
    /// If not specified, uses provider-specific defaults:
    /// - openai / groq: 4096
    /// - openai-compatible: 16384
    /// - gemini: 8192
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Per-request timeout. Long articles take minutes on slower models.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: None,
            base_url: None,
            max_tokens: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    pub fn provider(&self) -> Result<Provider> {
        Provider::from_str(&self.provider)
    }

    /// Get max_tokens value, using provider-specific default if not specified
    pub fn get_max_tokens(&self) -> u32 {
        if let Some(tokens) = self.max_tokens {
            return tokens;
        }

        match self.provider() {
            Ok(Provider::OpenAiCompatible) => 16384,
            Ok(Provider::Gemini) => 8192,
            _ => 4096,
        }
    }

    /// Environment variable the API key is read from
    pub fn key_env_var(&self) -> Option<String> {
        if let Some(ref var) = self.api_key_env {
            return Some(var.clone());
        }
        self.provider()
            .ok()
            .and_then(|p| p.default_key_env())
            .map(str::to_string)
    }
}

fn default_llm_timeout() -> u64 {
    300
}

/// Sampling temperature per agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Temperatures {
    #[serde(default = "default_creative_temperature")]
    pub draft: f32,
    #[serde(default = "default_edit_temperature")]
    pub title: f32,
    #[serde(default = "default_edit_temperature")]
    pub backlink: f32,
    #[serde(default = "default_creative_temperature")]
    pub expand: f32,
    #[serde(default = "default_edit_temperature")]
    pub readability: f32,
    #[serde(default = "default_brand_temperature")]
    pub brand: f32,
}

impl Default for Temperatures {
    fn default() -> Self {
        Self {
            draft: default_creative_temperature(),
            title: default_edit_temperature(),
            backlink: default_edit_temperature(),
            expand: default_creative_temperature(),
            readability: default_edit_temperature(),
            brand: default_brand_temperature(),
        }
    }
}

fn default_creative_temperature() -> f32 {
    0.7
}

fn default_edit_temperature() -> f32 {
    0.5
}

fn default_brand_temperature() -> f32 {
    0.6
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Characters kept from each competitor article in the draft prompt
    #[serde(default = "default_competitor_char_limit")]
    pub competitor_char_limit: usize,

    /// The title check looks for the keyword within this many leading characters
    #[serde(default = "default_title_window")]
    pub title_window_chars: usize,

    /// Characters of the article sent to the title fixer
    #[serde(default = "default_title_excerpt")]
    pub title_fix_excerpt_chars: usize,

    /// Sentence fragments this short (in characters) are ignored by metrics
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,

    /// Readability pass triggers when the mean sentence length leaves this band
    #[serde(default = "default_min_avg_words")]
    pub min_avg_sentence_words: f64,
    #[serde(default = "default_max_avg_words")]
    pub max_avg_sentence_words: f64,

    #[serde(default)]
    pub temperatures: Temperatures,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            competitor_char_limit: default_competitor_char_limit(),
            title_window_chars: default_title_window(),
            title_fix_excerpt_chars: default_title_excerpt(),
            min_sentence_chars: default_min_sentence_chars(),
            min_avg_sentence_words: default_min_avg_words(),
            max_avg_sentence_words: default_max_avg_words(),
            temperatures: Temperatures::default(),
        }
    }
}

fn default_competitor_char_limit() -> usize {
    8000
}

fn default_title_window() -> usize {
    200
}

fn default_title_excerpt() -> usize {
    1000
}

fn default_min_sentence_chars() -> usize {
    10
}

fn default_min_avg_words() -> f64 {
    8.0
}

fn default_max_avg_words() -> f64 {
    15.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandConfig {
    pub name: String,
    pub link: String,
    #[serde(default = "default_mention_count")]
    pub mention_count: usize,
    /// Term counted as a mention. Defaults to the first word of `name`
    /// so "Labellerr" and "Labellerr AI" both count.
    #[serde(default)]
    pub match_term: Option<String>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: "Labellerr AI".to_string(),
            link: "https://www.labellerr.com".to_string(),
            mention_count: default_mention_count(),
            match_term: None,
        }
    }
}

impl BrandConfig {
    pub fn match_term(&self) -> &str {
        match self.match_term.as_deref() {
            Some(term) if !term.trim().is_empty() => term.trim(),
            _ => self.name.split_whitespace().next().unwrap_or(&self.name),
        }
    }
}

fn default_mention_count() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_scrape_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_scrape_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string()
}

/// Extra instructions appended to individual agent prompts
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PromptsConfig {
    #[serde(default)]
    pub draft_custom: Option<String>,
    #[serde(default)]
    pub title_custom: Option<String>,
    #[serde(default)]
    pub backlink_custom: Option<String>,
    #[serde(default)]
    pub expand_custom: Option<String>,
    #[serde(default)]
    pub readability_custom: Option<String>,
    #[serde(default)]
    pub brand_custom: Option<String>,
}

impl Config {
    /// Load config from the working directory or user config directory
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    /// Load configuration from a specific path, or use default search paths
    pub fn load_with_path(path: Option<String>) -> Result<Self> {
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(&config_path)
                .with_context(|| format!("Failed to load config from {}", config_path));
        }

        if Path::new("backlinker.toml").exists() {
            debug!("Loading config from ./backlinker.toml");
            return Self::load_from_path("backlinker.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("backlinker").join("config.toml");
            if config_path.exists() {
                debug!("Loading config from {:?}", config_path);
                return Self::load_from_path(&config_path);
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the API key for the configured provider.
    /// Template placeholders such as `your_openai_api_key_here` count as missing.
    pub fn get_api_key(&self) -> Result<String> {
        let provider = self.llm.provider()?;
        let Some(env_var) = self.llm.key_env_var() else {
            return Ok(String::new()); // No API key needed
        };

        // Special case: "none" means no API key needed (local gateways)
        if env_var.eq_ignore_ascii_case("none") {
            return Ok(String::new());
        }

        let value = env::var(&env_var).ok().filter(|v| !is_placeholder_key(v));
        match value {
            Some(key) => Ok(key),
            None if provider == Provider::OpenAiCompatible => Ok(String::new()),
            None => anyhow::bail!(
                "API key not found in environment variable: {} (set it in .env or run `backlinker init`)",
                env_var
            ),
        }
    }
}

/// Values written by `backlinker init` before the user pastes a real key
pub fn is_placeholder_key(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || (v.starts_with("your_") && v.ends_with("_here"))
}
