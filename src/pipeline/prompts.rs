//! LLM prompts and response salvage for extraction.
//!
//! Model output is inherently unreliable free text; every parse here is a
//! fallible operation. The salvage strategy mirrors what works in practice
//! with small local models: scan for bracketed JSON candidates first, then
//! fall back to parsing the whole response.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{InferenceError, InferenceResult};
use crate::types::article::Article;

/// One structured item as the model returns it, before cleaning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStartupItem {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub country: String,

    #[serde(default)]
    pub category: String,
}

/// Prompt template for batch extraction. `{topic}` and `{articles}` are
/// substituted by [`format_extract_prompt`].
pub const EXTRACT_PROMPT: &str = r#"You are a startup analyst.
From the following startup news summaries, extract companies related to "{topic}".
Return only a JSON array, one object per company:
[{"name":"", "description":"", "country":"", "category":""}]

If no startups are found, return an empty list: []

Texts:
{articles}

JSON:"#;

/// Prompt template for enrichment re-extraction, restricted to the fields
/// still missing on a record.
pub const ENRICH_PROMPT: &str = r#"You are a startup analyst.
The company "{name}" is described below. Fill in ONLY these missing fields: {fields}.
Return only a JSON object:
{"description":"", "country":"", "category":""}

Leave any field you cannot determine as an empty string.

Text:
{page_text}

JSON:"#;

/// Build the extraction prompt for one batch of articles.
pub fn format_extract_prompt(topic: &str, articles: &[Article], max_body_chars: usize) -> String {
    let blocks: Vec<String> = articles
        .iter()
        .map(|a| {
            let title: String = a.title.chars().take(100).collect();
            let body: String = a.body_text.chars().take(max_body_chars).collect();
            format!("Article: {}\n{}", title, body.trim())
        })
        .collect();

    EXTRACT_PROMPT
        .replace("{topic}", topic)
        .replace("{articles}", &blocks.join("\n\n---\n\n"))
}

/// Build the enrichment prompt for one record's missing fields.
pub fn format_enrich_prompt(name: &str, missing_fields: &[&str], page_text: &str) -> String {
    let trimmed: String = page_text.chars().take(4000).collect();
    ENRICH_PROMPT
        .replace("{name}", name)
        .replace("{fields}", &missing_fields.join(", "))
        .replace("{page_text}", trimmed.trim())
}

fn array_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[.*?\]").expect("static regex"))
}

fn object_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static regex"))
}

/// Salvage a JSON array of startup items from free-text model output.
///
/// Tries each bracketed candidate, then the whole response. An empty array
/// is a valid result (the model found nothing).
pub fn parse_extract_response(response: &str) -> InferenceResult<Vec<RawStartupItem>> {
    for candidate in array_regex().find_iter(response) {
        if let Ok(items) = serde_json::from_str::<Vec<RawStartupItem>>(candidate.as_str().trim()) {
            return Ok(items);
        }
    }

    if let Ok(items) = serde_json::from_str::<Vec<RawStartupItem>>(response.trim()) {
        return Ok(items);
    }

    Err(InferenceError::Malformed(format!(
        "no JSON array found in {} chars of output",
        response.len()
    )))
}

/// Salvage a single JSON object (enrichment re-extraction) from model output.
pub fn parse_enrich_response(response: &str) -> InferenceResult<RawStartupItem> {
    if let Some(candidate) = object_regex().find(response) {
        if let Ok(item) = serde_json::from_str::<RawStartupItem>(candidate.as_str().trim()) {
            return Ok(item);
        }
    }

    serde_json::from_str::<RawStartupItem>(response.trim()).map_err(|e| {
        InferenceError::Malformed(format!("no JSON object found: {}", e))
    })
}
