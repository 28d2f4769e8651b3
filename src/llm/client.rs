use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one prompt as a single user message and return the text reply.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String>;
}

/// Canned article used by `--dry-run`. It satisfies every textual check for
/// the bundled sample request, so a dry run exercises only the draft step.
pub const MOCK_ARTICLE: &str = r#"TITLE: Data Annotation Tools: A Practical Guide for Computer Vision Teams

## Why Data Annotation Tools Matter

Modern computer vision projects depend on accurately labeled training data. Every model learns patterns directly from the labels your team provides. Poor labels quietly produce poor predictions in production systems. Good [data annotation tools](https://example.com/annotation-guide) keep that labeling work consistent and fast.

## Choosing the Right Platform

Start by listing the data types your project needs to handle. Images, video, text and point clouds all demand different workflows. Labellerr AI supports these formats inside a single collaborative workspace. Teams can review, correct and export labels without switching tools.

### Quality Control Features

Look for consensus scoring, reviewer queues and clear audit trails. These features catch labeling mistakes before they reach your model. [Labellerr AI](https://www.labellerr.com) adds automated checks that flag suspicious labels early. Reviewers then focus their attention where it matters most.

## Scaling Annotation Work

Large datasets need automation to stay within budget and schedule. Model-assisted labeling pre-fills annotations for humans to verify quickly. Labellerr AI offers this assisted workflow for common vision tasks. Your annotators spend less time drawing boxes by hand.

## Final Thoughts

Treat annotation as an engineering discipline, not a side task. Measure label quality the same way you measure model accuracy. Labellerr AI helps teams build that discipline from day one. Start small, measure often and expand what works."#;

pub struct MockLlmClient;

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, prompt: &str, _temperature: f32) -> Result<String> {
        // Revision prompts carry the current article; hand it back untouched
        // so a dry run never loses content.
        for marker in ["Current article:\n", "Article:\n"] {
            if let Some(start) = prompt.find(marker) {
                let rest = &prompt[start + marker.len()..];
                let end = rest.find("\n\nReturn the COMPLETE").unwrap_or(rest.len());
                let current = rest[..end].trim();
                if !current.is_empty() && !current.ends_with("...") {
                    return Ok(current.to_string());
                }
            }
        }
        Ok(MOCK_ARTICLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_article_for_draft() {
        let client = MockLlmClient::new();
        let out = client
            .complete("Create a comprehensive, detailed article", 0.7)
            .await
            .unwrap();
        assert!(out.starts_with("TITLE:"));
    }

    #[tokio::test]
    async fn test_mock_echoes_current_article_on_revision() {
        let client = MockLlmClient::new();
        let prompt = "Add this link: https://x.test\n\nCurrent article:\nTITLE: Hello\n\nBody text.\n\nReturn the COMPLETE article with the link added.";
        let out = client.complete(prompt, 0.5).await.unwrap();
        assert_eq!(out, "TITLE: Hello\n\nBody text.");
    }

    #[tokio::test]
    async fn test_mock_falls_back_for_truncated_excerpt() {
        let client = MockLlmClient::new();
        let prompt = "Fix the title.\n\nCurrent article:\nTITLE: Cut off...\n\nReturn the COMPLETE article with corrected title.";
        let out = client.complete(prompt, 0.5).await.unwrap();
        assert_eq!(out, MOCK_ARTICLE);
    }
}
