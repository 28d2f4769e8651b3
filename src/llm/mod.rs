//! LLM access: provider selection, HTTP clients, and the per-agent prompt templates.

pub mod client;
pub mod client_impl;
pub mod factory;
pub mod prompts;

use anyhow::bail;
use std::fmt;
use std::str::FromStr;

/// Hosted completion APIs the workflow can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Gemini,
    Groq,
    OpenAiCompatible,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::Groq => "groq",
            Provider::OpenAiCompatible => "openai-compatible",
        }
    }

    /// Conventional environment variable for this provider's key
    pub fn default_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Gemini => Some("GOOGLE_API_KEY"),
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::OpenAiCompatible => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" => Ok(Provider::OpenAi),
            "gemini" | "google" => Ok(Provider::Gemini),
            "groq" => Ok(Provider::Groq),
            "openai-compatible" | "openai_compatible" => Ok(Provider::OpenAiCompatible),
            other => bail!("Unknown LLM provider: {}", other),
        }
    }
}

/// Drop a litellm-style routing prefix ("openai/gpt-4o" -> "gpt-4o").
pub fn strip_provider_prefix(model: &str) -> &str {
    for prefix in ["openai/", "gemini/", "google/", "groq/"] {
        if let Some(rest) = model.strip_prefix(prefix) {
            return rest;
        }
    }
    model
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!(Provider::from_str("OpenAI").unwrap(), Provider::OpenAi);
        assert_eq!(Provider::from_str("google").unwrap(), Provider::Gemini);
        assert_eq!(Provider::from_str(" groq ").unwrap(), Provider::Groq);
        assert_eq!(
            Provider::from_str("openai-compatible").unwrap(),
            Provider::OpenAiCompatible
        );
        let err = Provider::from_str("cohere").unwrap_err();
        assert!(err.to_string().contains("Unknown LLM provider"));
    }

    #[test]
    fn test_provider_display_round_trips() {
        for p in [
            Provider::OpenAi,
            Provider::Gemini,
            Provider::Groq,
            Provider::OpenAiCompatible,
        ] {
            assert_eq!(Provider::from_str(&p.to_string()).unwrap(), p);
        }
    }

    #[test]
    fn test_strip_provider_prefix() {
        assert_eq!(strip_provider_prefix("openai/gpt-4o"), "gpt-4o");
        assert_eq!(strip_provider_prefix("gemini/gemini-1.5-flash"), "gemini-1.5-flash");
        assert_eq!(strip_provider_prefix("groq/llama-3.1-70b"), "llama-3.1-70b");
        assert_eq!(strip_provider_prefix("gpt-4o-mini"), "gpt-4o-mini");
    }
}
