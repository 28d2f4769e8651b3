use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::config::is_placeholder_key;
use crate::llm::Provider;

/// Providers `init` writes a key slot for, in template order
const KEY_SLOTS: [(Provider, &str, &str); 3] = [
    (
        Provider::Gemini,
        "Google Gemini",
        "https://aistudio.google.com/app/apikey",
    ),
    (
        Provider::OpenAi,
        "OpenAI",
        "https://platform.openai.com/api-keys",
    ),
    (Provider::Groq, "Groq", "https://console.groq.com/keys"),
];

fn placeholder(env_var: &str) -> String {
    format!("your_{}_here", env_var.to_lowercase())
}

/// Contents of a fresh `.env`. Only `provider` gets `api_key`; every other
/// slot keeps its placeholder.
pub fn env_template(provider: Provider, api_key: Option<&str>) -> String {
    let mut out = String::from("# API keys for backlinker\n");
    for (slot, name, url) in KEY_SLOTS {
        let Some(env_var) = slot.default_key_env() else {
            continue;
        };
        let value = match api_key {
            Some(key) if slot == provider && !key.trim().is_empty() => key.trim().to_string(),
            _ => placeholder(env_var),
        };
        out.push_str(&format!("\n# {} ({})\n{}={}\n", name, url, env_var, value));
    }
    out
}

pub fn run(path: String, provider: String, api_key: Option<String>, force: bool) -> Result<()> {
    let provider: Provider = provider.parse()?;
    let Some(env_var) = provider.default_key_env() else {
        bail!(
            "Provider '{}' has no API key slot; use openai, gemini or groq",
            provider
        );
    };

    let target = Path::new(&path);
    if target.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            target.display()
        );
    }

    fs::write(target, env_template(provider, api_key.as_deref()))
        .with_context(|| format!("Failed to write {}", target.display()))?;
    println!("✓ Wrote {}", target.display());

    let key_set = api_key.as_deref().map(|k| !is_placeholder_key(k)).unwrap_or(false);
    if key_set {
        println!("✓ {} is set", env_var);
    } else {
        let url = KEY_SLOTS
            .iter()
            .find(|(slot, _, _)| *slot == provider)
            .map(|(_, _, url)| *url)
            .unwrap_or_default();
        println!("! {} is not set yet. Get a key at {}", env_var, url);
        println!("  then replace {} in {}", placeholder(env_var), target.display());
    }

    println!("\nNext: backlinker generate <request.toml> --provider {}", provider);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_fills_only_chosen_provider() {
        let text = env_template(Provider::Groq, Some("gsk_123"));
        assert!(text.contains("GROQ_API_KEY=gsk_123"));
        assert!(text.contains("GOOGLE_API_KEY=your_google_api_key_here"));
        assert!(text.contains("OPENAI_API_KEY=your_openai_api_key_here"));
    }

    #[test]
    fn test_template_placeholders_count_as_missing() {
        let text = env_template(Provider::Gemini, None);
        for line in text.lines().filter(|l| l.contains('=')) {
            let value = line.split_once('=').unwrap().1;
            assert!(is_placeholder_key(value), "{}", line);
        }
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "KEEP=1\n").unwrap();
        let p = path.to_string_lossy().to_string();

        let err = run(p.clone(), "openai".to_string(), None, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "KEEP=1\n");

        run(p, "openai".to_string(), Some("sk-live".to_string()), true).unwrap();
        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains("OPENAI_API_KEY=sk-live"));
    }

    #[test]
    fn test_rejects_keyless_provider() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join(".env").to_string_lossy().to_string();
        assert!(run(p, "openai-compatible".to_string(), None, false).is_err());
    }
}
