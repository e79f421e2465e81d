//! Structured startup records derived from articles.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::article::hex_prefix;

/// Market category of a startup, as classified by extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Ai,
    Fintech,
    Saas,
    Climate,
    Health,
    Robotics,
    Ecommerce,
    Other,
    Unknown,
}

impl Category {
    /// Parse a free-text category from model output, defaulting to Unknown.
    ///
    /// Model output is unreliable; match loosely on common spellings, but on
    /// whole tokens, not raw substrings: "ai" hides inside ordinary words
    /// ("sustainability", "retail") and must only count as its own word.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        if s.is_empty() {
            return Category::Unknown;
        }

        let tokens: Vec<&str> = s
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        let has = |word: &str| tokens.iter().any(|t| *t == word);
        let has_prefix = |prefix: &str| tokens.iter().any(|t| t.starts_with(prefix));

        if has("ai") || has("ml") || has_prefix("artificial") || (has("machine") && has("learning"))
        {
            Category::Ai
        } else if has_prefix("fintech") || has_prefix("financ") || has_prefix("payment") || has_prefix("bank") {
            Category::Fintech
        } else if has("saas") || has_prefix("software") {
            Category::Saas
        } else if has_prefix("climate") || has_prefix("clean") || has_prefix("sustain") {
            Category::Climate
        } else if has_prefix("health") || has_prefix("medic") || has_prefix("medtech") || has_prefix("bio") {
            Category::Health
        } else if has_prefix("robot") {
            Category::Robotics
        } else if has("ecommerce") || has_prefix("commerce") || has_prefix("retail") || has_prefix("marketplace") {
            Category::Ecommerce
        } else if s == "unknown" || s == "n/a" || s == "none" {
            Category::Unknown
        } else {
            Category::Other
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Ai => "AI",
            Category::Fintech => "Fintech",
            Category::Saas => "SaaS",
            Category::Climate => "Climate",
            Category::Health => "Health",
            Category::Robotics => "Robotics",
            Category::Ecommerce => "E-commerce",
            Category::Other => "Other",
            Category::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-attribute extraction confidence, 0.0 to 1.0.
///
/// Primary extraction sets 1.0 for fields it filled; enrichment fills gaps
/// at a lower grade. Absent means the field was never populated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeConfidence {
    pub description: Option<f32>,
    pub country: Option<f32>,
    pub category: Option<f32>,
}

/// A structured startup entity derived from one or more articles.
///
/// Mutated in place only by enrichment (fill-if-missing) and clustering
/// (cluster_id assignment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupRecord {
    /// Derived from the normalized name; stable across enrichment.
    pub id: String,

    /// Non-empty for any record that survives extraction.
    pub name: String,

    pub description: String,

    pub country: Option<String>,

    pub category: Category,

    /// Back-reference to the article the record was extracted from
    /// (lookup-only, not an ownership edge).
    pub source_article_id: String,

    #[serde(default)]
    pub confidence: AttributeConfidence,

    /// Set once enrichment has filled at least one field.
    #[serde(default)]
    pub enriched: bool,

    /// Filled only by cluster analysis.
    #[serde(default)]
    pub cluster_id: Option<usize>,
}

impl StartupRecord {
    /// Case-insensitive, whitespace-collapsed dedup key.
    pub fn normalize_name(name: &str) -> String {
        name.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
            .trim_matches(|c: char| c == '.' || c == ',')
            .to_string()
    }

    /// Derive the stable record id from a name.
    pub fn derive_id(name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(Self::normalize_name(name).as_bytes());
        hex_prefix(&hasher.finalize(), 16)
    }

    /// Text used for cluster vectorization.
    pub fn cluster_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }

    /// Whether the description is too thin to be useful.
    pub fn has_thin_description(&self, min_len: usize) -> bool {
        self.description.trim().len() < min_len
    }

    /// Fill empty fields from another extraction, never overwriting
    /// populated ones. Returns true if anything changed.
    pub fn merge_missing(
        &mut self,
        description: Option<&str>,
        country: Option<&str>,
        category: Option<Category>,
        confidence: f32,
        thin_description_len: usize,
    ) -> bool {
        let mut changed = false;

        if self.has_thin_description(thin_description_len) {
            if let Some(desc) = description.map(str::trim).filter(|d| !d.is_empty()) {
                self.description = desc.to_string();
                self.confidence.description = Some(confidence);
                changed = true;
            }
        }

        if self.country.is_none() {
            if let Some(country) = country.map(str::trim).filter(|c| !c.is_empty()) {
                self.country = Some(country.to_string());
                self.confidence.country = Some(confidence);
                changed = true;
            }
        }

        if self.category == Category::Unknown {
            if let Some(cat) = category.filter(|c| *c != Category::Unknown) {
                self.category = cat;
                self.confidence.category = Some(confidence);
                changed = true;
            }
        }

        if changed {
            self.enriched = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> StartupRecord {
        StartupRecord {
            id: StartupRecord::derive_id(name),
            name: name.to_string(),
            description: String::new(),
            country: None,
            category: Category::Unknown,
            source_article_id: "a1".to_string(),
            confidence: AttributeConfidence::default(),
            enriched: false,
            cluster_id: None,
        }
    }

    #[test]
    fn test_normalize_name_collapses_case_and_whitespace() {
        assert_eq!(
            StartupRecord::normalize_name("  Acme   Inc "),
            StartupRecord::normalize_name("acme inc")
        );
        assert_eq!(
            StartupRecord::normalize_name("Acme Inc."),
            StartupRecord::normalize_name("acme inc")
        );
    }

    #[test]
    fn test_derive_id_stable_across_variants() {
        assert_eq!(
            StartupRecord::derive_id("Acme Inc"),
            StartupRecord::derive_id("acme  inc")
        );
    }

    #[test]
    fn test_merge_fills_only_missing() {
        let mut r = record("Acme");
        r.description = "A long enough description of what Acme actually builds and sells.".into();
        r.country = Some("Germany".into());

        let changed = r.merge_missing(Some("other text"), Some("France"), None, 0.5, 100);

        // Description is thin (< 100) so it may be replaced; country must not be.
        assert!(changed);
        assert_eq!(r.country.as_deref(), Some("Germany"));
    }

    #[test]
    fn test_merge_noop_when_populated() {
        let mut r = record("Acme");
        r.description = "x".repeat(150);
        r.country = Some("Germany".into());
        r.category = Category::Fintech;

        let changed = r.merge_missing(Some("new"), Some("France"), Some(Category::Ai), 0.5, 100);
        assert!(!changed);
        assert!(!r.enriched);
        assert_eq!(r.category, Category::Fintech);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("FinTech"), Category::Fintech);
        assert_eq!(Category::parse("Artificial Intelligence"), Category::Ai);
        assert_eq!(Category::parse(""), Category::Unknown);
        assert_eq!(Category::parse("space mining"), Category::Other);
    }

    #[test]
    fn test_category_parse_matches_whole_words_only() {
        // "ai" must not match inside ordinary words.
        assert_eq!(Category::parse("sustainability"), Category::Climate);
        assert_eq!(Category::parse("retail"), Category::Ecommerce);
        assert_eq!(Category::parse("maintenance"), Category::Other);

        assert_eq!(Category::parse("ai"), Category::Ai);
        assert_eq!(Category::parse("AI / deep tech"), Category::Ai);
        assert_eq!(Category::parse("machine learning"), Category::Ai);
        assert_eq!(Category::parse("e-commerce"), Category::Ecommerce);
        assert_eq!(Category::parse("healthtech"), Category::Health);
        assert_eq!(Category::parse("biotech"), Category::Health);
    }
}
