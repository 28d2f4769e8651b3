//! backlinker - Generate SEO backlink articles with a chain of LLM agents
//!
//! Scrapes an original article and its competitors, drafts a new article
//! with an LLM, then runs it through targeted revision agents (title,
//! backlink, length, readability, brand mentions) that only fire when a
//! text check fails. Supports OpenAI, Gemini, Groq and any
//! OpenAI-compatible endpoint.

pub mod cli;
pub mod config;
pub mod llm;
pub mod metrics;
pub mod pipeline;
pub mod scrape;
pub mod util;
