// Prompt templates for the six article agents

use crate::util::truncate_chars;

/// Everything the drafting agent needs to know about the article
pub struct DraftContext<'a> {
    pub primary_keyword: &'a str,
    pub lsi_keywords: &'a [String],
    pub original_content: &'a str,
    pub original_url: &'a str,
    pub competitors: &'a [&'a str],
    pub competitor_char_limit: usize,
    pub related_links: &'a [String],
    pub target_word_count: usize,
    pub keyword_density: (f64, f64),
    pub brand_name: &'a str,
    pub brand_link: &'a str,
    pub brand_mentions: usize,
}

fn append_custom(prompt: &mut String, custom_instructions: Option<&str>) {
    if let Some(custom) = custom_instructions {
        if !custom.trim().is_empty() {
            prompt.push_str(&format!("\n\nADDITIONAL INSTRUCTIONS:\n{}", custom.trim()));
        }
    }
}

/// Competitor bodies, each truncated and labelled. Empty bodies are skipped
/// but keep their number so labels match the input order.
pub fn competitor_section(competitors: &[&str], char_limit: usize) -> String {
    let mut section = String::new();
    for (i, content) in competitors.iter().enumerate() {
        if content.trim().is_empty() {
            continue;
        }
        section.push_str(&format!(
            "\n\n=== COMPETITOR {} ===\n{}\n",
            i + 1,
            truncate_chars(content, char_limit)
        ));
    }
    section
}

pub fn draft_article(ctx: &DraftContext<'_>, custom_instructions: Option<&str>) -> String {
    let competitor_content = competitor_section(ctx.competitors, ctx.competitor_char_limit);

    let lsi_line = if ctx.lsi_keywords.is_empty() {
        String::new()
    } else {
        format!(
            "\n12. Work these related terms in naturally: {}",
            ctx.lsi_keywords.join(", ")
        )
    };

    let related_line = if ctx.related_links.is_empty() {
        String::new()
    } else {
        format!(
            "\n13. Where it helps the reader, reference these related resources: {}",
            ctx.related_links.join(", ")
        )
    };

    let mut prompt = format!(
        r#"Create a comprehensive, detailed article by intelligently combining the original article with competitor insights.

PRIMARY SOURCE (60-70% weight):
{original}

COMPETITOR SOURCES (30-40% combined):
{competitor_content}

REQUIREMENTS:
1. Title MUST include: "{keyword}" and be compelling
2. Write {words}+ words with substantial, meaningful content
3. Use active voice with sentences of 10-12 words (not too short, not too long)
4. Create detailed, informative content with examples, explanations, and insights
5. Embed this link naturally: {url}
   - Use "{keyword}" as anchor text
6. Mention "{brand}" {mentions} times naturally
   - Link 2-3 mentions to: {brand_link}
7. Use clear H2, H3 headings for structure
8. Write for US audience with engaging, professional tone
9. Include practical examples, use cases, and actionable insights
10. Make the content comprehensive and valuable, not vague
11. Keep "{keyword}" at roughly {density_min:.1}-{density_max:.1}% of all words{lsi_line}{related_line}

CONTENT QUALITY:
- Provide detailed explanations and context
- Include specific examples and use cases
- Add practical insights and applications
- Use professional, engaging language
- Ensure each paragraph adds value
- Create a cohesive, well-structured narrative

Return ONLY the article with this format:
TITLE: [Your compelling title with primary keyword]

[Comprehensive article content with detailed explanations, examples, and insights]"#,
        original = ctx.original_content,
        competitor_content = competitor_content,
        keyword = ctx.primary_keyword,
        words = ctx.target_word_count,
        url = ctx.original_url,
        brand = ctx.brand_name,
        mentions = ctx.brand_mentions,
        brand_link = ctx.brand_link,
        density_min = ctx.keyword_density.0,
        density_max = ctx.keyword_density.1,
        lsi_line = lsi_line,
        related_line = related_line,
    );

    append_custom(&mut prompt, custom_instructions);
    prompt
}

pub fn fix_title(
    article: &str,
    keyword: &str,
    excerpt_chars: usize,
    custom_instructions: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Fix the title to include \"{}\". Keep everything else the same.",
        keyword
    );
    append_custom(&mut prompt, custom_instructions);
    prompt.push_str(&format!(
        "\n\nCurrent article:\n{}...\n\nReturn the COMPLETE article with corrected title.",
        truncate_chars(article, excerpt_chars)
    ));
    prompt
}

pub fn add_backlink(
    article: &str,
    url: &str,
    keyword: &str,
    custom_instructions: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Add this link: {}\nUse \"{}\" as anchor text.\nPlace it naturally in the article.",
        url, keyword
    );
    append_custom(&mut prompt, custom_instructions);
    prompt.push_str(&format!(
        "\n\nCurrent article:\n{}\n\nReturn the COMPLETE article with the link added.",
        article
    ));
    prompt
}

pub fn expand_article(
    article: &str,
    current_words: usize,
    target_words: usize,
    custom_instructions: Option<&str>,
) -> String {
    let mut prompt = format!(
        r#"Expand this article from {} to {}+ words with substantial, meaningful content.

EXPANSION REQUIREMENTS:
- Add detailed explanations and context
- Include specific examples and use cases
- Provide practical insights and applications
- Add relevant statistics or data points
- Include step-by-step processes where applicable
- Add real-world scenarios and case studies
- Ensure each addition adds genuine value
- Maintain professional, engaging tone
- Keep sentences 10-12 words long
- No fluff or repetitive content"#,
        current_words, target_words
    );
    append_custom(&mut prompt, custom_instructions);
    prompt.push_str(&format!(
        "\n\nCurrent article:\n{}\n\nReturn the COMPLETE expanded article with substantial, valuable content.",
        article
    ));
    prompt
}

pub fn optimize_readability(article: &str, custom_instructions: Option<&str>) -> String {
    let mut prompt = r#"Optimize sentence length to 10-12 words per sentence for better readability.

INSTRUCTIONS:
- Keep sentences between 8-15 words (target: 10-12 words)
- If sentences are too short, combine them naturally
- If sentences are too long, break them into shorter ones
- Maintain the same meaning and flow
- Keep the content detailed and informative
- Ensure professional, engaging tone
- Keep every link and heading exactly as written"#
        .to_string();
    append_custom(&mut prompt, custom_instructions);
    prompt.push_str(&format!(
        "\n\nCurrent article:\n{}\n\nReturn the COMPLETE article with optimized sentence length.",
        article
    ));
    prompt
}

pub fn add_brand_mentions(
    article: &str,
    brand_name: &str,
    brand_link: &str,
    current_mentions: usize,
    target_mentions: usize,
    custom_instructions: Option<&str>,
) -> String {
    let missing = target_mentions.saturating_sub(current_mentions);
    let to_link = target_mentions.saturating_sub(2);
    let mut prompt = format!(
        r#"Add {missing} more natural mentions of "{brand}" to this article.
Link {to_link} of them to: {link}

CONTEXT REQUIREMENTS:
- Only mention where contextually relevant (data annotation, AI tools, computer vision, machine learning, etc.)
- Make mentions feel natural and valuable to the reader
- Integrate smoothly into existing content
- Provide context about what {brand} does
- Maintain professional tone
- Don't force mentions where they don't fit"#,
        missing = missing,
        brand = brand_name,
        to_link = to_link,
        link = brand_link,
    );
    append_custom(&mut prompt, custom_instructions);
    prompt.push_str(&format!(
        "\n\nArticle:\n{}\n\nReturn the COMPLETE article with natural, contextual brand mentions added.",
        article
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(competitors: &'a [&'a str], lsi: &'a [String]) -> DraftContext<'a> {
        DraftContext {
            primary_keyword: "data annotation tools",
            lsi_keywords: lsi,
            original_content: "Original body.",
            original_url: "https://blog.example/annotation",
            competitors,
            competitor_char_limit: 5,
            related_links: &[],
            target_word_count: 1200,
            keyword_density: (1.5, 3.0),
            brand_name: "Labellerr AI",
            brand_link: "https://www.labellerr.com",
            brand_mentions: 4,
        }
    }

    #[test]
    fn test_draft_prompt_includes_requirements() {
        let lsi = vec!["image labeling".to_string(), "bounding boxes".to_string()];
        let prompt = draft_article(&ctx(&[], &lsi), None);
        assert!(prompt.contains("Title MUST include: \"data annotation tools\""));
        assert!(prompt.contains("Write 1200+ words"));
        assert!(prompt.contains("Embed this link naturally: https://blog.example/annotation"));
        assert!(prompt.contains("Mention \"Labellerr AI\" 4 times"));
        assert!(prompt.contains("1.5-3.0%"));
        assert!(prompt.contains("10. Make the content comprehensive and valuable, not vague"));
        assert!(prompt.contains("11. Keep \"data annotation tools\" at roughly 1.5-3.0%"));
        assert!(prompt.contains("12. Work these related terms in naturally: image labeling, bounding boxes"));
        assert!(!prompt.contains("related resources"));
        assert!(prompt.ends_with("insights]"));
    }

    #[test]
    fn test_competitor_section_truncates_and_skips_empty() {
        let section = competitor_section(&["abcdefghij", "   ", "xyz"], 5);
        assert!(section.contains("=== COMPETITOR 1 ===\nabcde\n"));
        assert!(!section.contains("COMPETITOR 2"));
        assert!(section.contains("=== COMPETITOR 3 ===\nxyz\n"));
        assert!(!section.contains("fghij"));
    }

    #[test]
    fn test_custom_instructions_appended() {
        let prompt = add_backlink("body", "https://x.test", "kw", Some("Use British spelling."));
        assert!(prompt.contains("ADDITIONAL INSTRUCTIONS:\nUse British spelling."));
        assert!(prompt.ends_with("Return the COMPLETE article with the link added."));
    }

    #[test]
    fn test_fix_title_uses_excerpt() {
        let article = "TITLE: Something\n".to_string() + &"word ".repeat(500);
        let prompt = fix_title(&article, "kw", 20, None);
        assert!(prompt.contains("Current article:\nTITLE: Something\nwor..."));
        assert!(!prompt.contains(&"word ".repeat(10)));
    }

    #[test]
    fn test_expand_prompt_mentions_counts() {
        let prompt = expand_article("short article", 2, 1000, None);
        assert!(prompt.starts_with("Expand this article from 2 to 1000+ words"));
    }

    #[test]
    fn test_brand_prompt_saturates_counts() {
        let prompt = add_brand_mentions("body", "Labellerr AI", "https://l.test", 3, 1, None);
        assert!(prompt.starts_with("Add 0 more natural mentions of \"Labellerr AI\""));
        assert!(prompt.contains("Link 0 of them to: https://l.test"));

        let prompt = add_brand_mentions("body", "Labellerr AI", "https://l.test", 1, 5, None);
        assert!(prompt.starts_with("Add 4 more natural mentions"));
        assert!(prompt.contains("Link 3 of them"));
    }
}
