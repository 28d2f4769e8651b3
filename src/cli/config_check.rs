use anyhow::Result;
use std::env;

use crate::config::{is_placeholder_key, Config};
use crate::llm::Provider;

struct CheckResult {
    passed: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl CheckResult {
    fn new() -> Self {
        Self {
            passed: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn pass(&mut self, msg: impl Into<String>) {
        self.passed.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }
}

pub fn run(config_path: Option<String>) -> Result<()> {
    let mut results = CheckResult::new();

    let config = match Config::load_with_path(config_path.clone()) {
        Ok(config) => {
            let source = config_path.as_deref().unwrap_or("default search path");
            results.pass(format!("Config loaded from {}", source));
            config
        }
        Err(e) => {
            results.error(format!("Failed to load config: {:#}", e));
            print_results(&results);
            anyhow::bail!("{} config error(s) found", results.errors.len());
        }
    };

    check_config(&config, &mut results);
    print_results(&results);

    if !results.errors.is_empty() {
        anyhow::bail!("{} config error(s) found", results.errors.len());
    }
    Ok(())
}

fn check_config(config: &Config, results: &mut CheckResult) {
    match config.llm.provider() {
        Ok(provider) => {
            results.pass(format!(
                "LLM provider: {} (model: {})",
                provider, config.llm.model
            ));
            check_api_key(config, provider, results);
            if provider == Provider::OpenAiCompatible && config.llm.base_url.is_none() {
                results.warn(
                    "openai-compatible provider without base_url, will use http://localhost:11434/v1",
                );
            }
        }
        Err(e) => results.error(e.to_string()),
    }

    let generation = &config.generation;
    if generation.min_avg_sentence_words > generation.max_avg_sentence_words {
        results.error(format!(
            "Readability band is inverted: {} > {}",
            generation.min_avg_sentence_words, generation.max_avg_sentence_words
        ));
    } else {
        results.pass(format!(
            "Readability band: {}-{} words per sentence",
            generation.min_avg_sentence_words, generation.max_avg_sentence_words
        ));
    }

    let temps = &generation.temperatures;
    for (name, t) in [
        ("draft", temps.draft),
        ("title", temps.title),
        ("backlink", temps.backlink),
        ("expand", temps.expand),
        ("readability", temps.readability),
        ("brand", temps.brand),
    ] {
        if !(0.0..=2.0).contains(&t) {
            results.error(format!("Temperature for {} must be 0.0-2.0 (got {})", name, t));
        }
    }

    if config.brand.name.trim().is_empty() {
        results.error("Brand name is empty");
    } else {
        results.pass(format!(
            "Brand: {} ({} mention(s), matched on \"{}\")",
            config.brand.name,
            config.brand.mention_count,
            config.brand.match_term()
        ));
    }

    if config.scraper.timeout_secs < 5 {
        results.warn(format!(
            "Scraper timeout {}s is very short, slow sites will fail",
            config.scraper.timeout_secs
        ));
    }
}

fn check_api_key(config: &Config, provider: Provider, results: &mut CheckResult) {
    let is_compat = provider == Provider::OpenAiCompatible;
    let Some(env_var) = config.llm.key_env_var() else {
        results.pass("No API key needed");
        return;
    };
    if env_var.eq_ignore_ascii_case("none") {
        results.pass("No API key needed");
        return;
    }

    match env::var(&env_var) {
        Ok(v) if !is_placeholder_key(&v) => results.pass(format!("{} is set", env_var)),
        Ok(_) if is_compat => results.warn(format!(
            "{} holds no real key (OK for local models, needed for gateways)",
            env_var
        )),
        Ok(_) => results.error(format!("{} is empty or still a placeholder", env_var)),
        Err(_) if is_compat => results.warn(format!(
            "{} is not set (OK for local models, needed for gateways)",
            env_var
        )),
        Err(_) => results.error(format!("{} is not set", env_var)),
    }
}

fn print_results(results: &CheckResult) {
    println!();
    for msg in &results.passed {
        println!("  \u{2713} {}", msg);
    }
    for msg in &results.warnings {
        println!("  ! {}", msg);
    }
    for msg in &results.errors {
        println!("  \u{2717} {}", msg);
    }
    println!();
    println!(
        "{} passed, {} warnings, {} errors",
        results.passed.len(),
        results.warnings.len(),
        results.errors.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_missing_key_is_an_error() {
        env::remove_var("GROQ_API_KEY");
        let mut config = Config::default();
        config.llm.provider = "groq".to_string();
        let mut results = CheckResult::new();
        check_config(&config, &mut results);
        assert!(results.errors.iter().any(|e| e == "GROQ_API_KEY is not set"));
    }

    #[test]
    #[serial]
    fn test_placeholder_key_is_an_error() {
        env::set_var("GROQ_API_KEY", "your_groq_api_key_here");
        let mut config = Config::default();
        config.llm.provider = "groq".to_string();
        let mut results = CheckResult::new();
        check_config(&config, &mut results);
        env::remove_var("GROQ_API_KEY");
        assert!(results.errors.iter().any(|e| e.contains("placeholder")));
    }

    #[test]
    fn test_compat_without_key_only_warns() {
        let mut config = Config::default();
        config.llm.provider = "openai-compatible".to_string();
        let mut results = CheckResult::new();
        check_config(&config, &mut results);
        assert!(results.errors.is_empty());
        assert!(results.warnings.iter().any(|w| w.contains("base_url")));
    }

    #[test]
    fn test_unknown_provider_and_bad_temperature() {
        let mut config = Config::default();
        config.llm.provider = "bogus".to_string();
        config.generation.temperatures.brand = 3.5;
        let mut results = CheckResult::new();
        check_config(&config, &mut results);
        assert!(results.errors.iter().any(|e| e.contains("Unknown LLM provider")));
        assert!(results.errors.iter().any(|e| e.contains("brand")));
    }

    #[test]
    fn test_unparseable_config_file_fails_check() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[llm\nprovider = ").unwrap();
        let err = run(Some(path.to_string_lossy().to_string())).unwrap_err();
        assert_eq!(err.to_string(), "1 config error(s) found");
    }
}
