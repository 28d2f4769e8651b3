use anyhow::Result;
use tracing::info;

use super::client::{LlmClient, MockLlmClient};
use super::client_impl::{GeminiClient, OpenAIClient};
use super::{strip_provider_prefix, Provider};
use crate::config::Config;

/// Create an LLM client based on configuration
pub fn create_client(config: &Config, dry_run: bool) -> Result<Box<dyn LlmClient>> {
    if dry_run {
        info!("Dry run: using mock LLM client");
        return Ok(Box::new(MockLlmClient::new()));
    }

    let provider = config.llm.provider()?;
    let api_key = config.get_api_key()?;
    let model = strip_provider_prefix(&config.llm.model).to_string();
    let max_tokens = config.llm.get_max_tokens();
    let timeout = config.llm.timeout_secs;

    info!("Using {} with model {}", provider, model);

    let client: Box<dyn LlmClient> = match provider {
        Provider::OpenAi => match config.llm.base_url {
            Some(ref base_url) => Box::new(OpenAIClient::with_base_url(
                api_key,
                model,
                base_url.clone(),
                max_tokens,
                timeout,
            )?),
            None => Box::new(OpenAIClient::new(api_key, model, max_tokens, timeout)?),
        },

        Provider::Groq => match config.llm.base_url {
            Some(ref base_url) => Box::new(
                OpenAIClient::with_base_url(api_key, model, base_url.clone(), max_tokens, timeout)?
                    .with_label("Groq"),
            ),
            None => Box::new(OpenAIClient::groq(api_key, model, max_tokens, timeout)?),
        },

        Provider::OpenAiCompatible => {
            let base_url = config
                .llm
                .base_url
                .clone()
                .unwrap_or_else(|| "http://localhost:11434/v1".to_string());

            Box::new(
                OpenAIClient::with_base_url(api_key, model, base_url, max_tokens, timeout)?
                    .with_label("OpenAI-compatible"),
            )
        }

        Provider::Gemini => match config.llm.base_url {
            Some(ref base_url) => Box::new(GeminiClient::with_base_url(
                api_key,
                model,
                base_url.clone(),
                max_tokens,
                timeout,
            )?),
            None => Box::new(GeminiClient::new(api_key, model, max_tokens, timeout)?),
        },
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn test_create_mock_client_for_dry_run() {
        let mut config = Config::default();
        // Dry run must not require a key or even a known provider
        config.llm.provider = "unknown".to_string();
        create_client(&config, true).unwrap();
    }

    #[test]
    #[serial]
    fn test_create_each_provider() {
        env::set_var("BACKLINKER_FACTORY_KEY", "test_key");
        for provider in ["openai", "gemini", "groq", "openai-compatible"] {
            let mut config = Config::default();
            config.llm.provider = provider.to_string();
            config.llm.api_key_env = Some("BACKLINKER_FACTORY_KEY".to_string());
            assert!(
                create_client(&config, false).is_ok(),
                "provider {} should build",
                provider
            );
        }
        env::remove_var("BACKLINKER_FACTORY_KEY");
    }

    #[test]
    fn test_create_client_with_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "unknown_provider".to_string();
        config.llm.api_key_env = Some("none".to_string());
        let err = create_client(&config, false).err().unwrap();
        assert!(err.to_string().contains("Unknown LLM provider"));
    }

    #[test]
    fn test_create_client_without_api_key() {
        let mut config = Config::default();
        config.llm.api_key_env = Some("BACKLINKER_TEST_NONEXISTENT_KEY_FACTORY_99999".to_string());
        let err = create_client(&config, false).err().unwrap();
        assert!(err.to_string().contains("API key not found"));
    }
}
