//! Configuration surface consumed by the pipeline.
//!
//! Stage configs carry defaults matching the original tooling (batch size 5,
//! 30 entries per feed, 120 s inference timeout, 5 s fetch timeout) and
//! `with_*` builders for overrides.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PipelineError, Result};

/// The fixed set of feed categories a run can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceCategory {
    GeneralStartups,
    AiDeepTech,
    FintechSaas,
    ClimateSustainability,
    HealthRobotics,
    RegionalEurope,
}

impl SourceCategory {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SourceCategory::GeneralStartups => "General Startups",
            SourceCategory::AiDeepTech => "AI & DeepTech",
            SourceCategory::FintechSaas => "Fintech & SaaS",
            SourceCategory::ClimateSustainability => "Climate & Sustainability",
            SourceCategory::HealthRobotics => "Health & Robotics",
            SourceCategory::RegionalEurope => "Regional / Europe",
        }
    }
}

impl std::fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which structured dataset to pull alongside the feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSource {
    /// A dataset snapshot on local disk.
    Local,
    /// The upstream dataset on GitHub.
    Github,
    /// Feeds only.
    #[default]
    None,
}

/// Feed URLs per category, loaded as static configuration data.
///
/// The catalog is data, not logic: the pipeline only reads it to know which
/// category a run is scoped to; actual feed fetching is collaborator-owned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedCatalog {
    #[serde(default)]
    pub categories: IndexMap<SourceCategory, Vec<String>>,
}

impl FeedCatalog {
    /// Parse a catalog from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The catalog bundled with the crate (`data/feeds.json`).
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(include_str!("../../data/feeds.json"))
    }

    /// Feed URLs for a category.
    pub fn feeds(&self, category: SourceCategory) -> &[String] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Configuration for source normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Entries with less body text than this are dropped as boilerplate.
    pub min_body_len: usize,

    /// Cap on entries taken per feed (collaborator hint, also enforced here).
    pub max_entries_per_feed: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            min_body_len: 50,
            max_entries_per_feed: 30,
        }
    }
}

/// Configuration for the relevance pre-filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceConfig {
    /// Keywords that mark an article as venture-related. Topic tokens are
    /// added on top at run time.
    pub keywords: Vec<String>,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            keywords: [
                "startup", "company", "ai", "software", "tech", "business", "venture",
                "funding", "raised",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Configuration for batched extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Articles per inference request.
    pub batch_size: usize,

    /// Bounded concurrency across batches.
    pub concurrency: usize,

    /// Timeout per inference call, in seconds.
    pub timeout_secs: u64,

    /// Article body text is truncated to this many chars in prompts.
    pub max_body_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            concurrency: 2,
            timeout_secs: 120,
            max_body_chars: 1500,
        }
    }
}

impl ExtractConfig {
    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the batch concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration for the optional enrichment stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichConfig {
    pub enabled: bool,

    /// Descriptions shorter than this count as thin (missing).
    pub thin_description_len: usize,

    /// Timeout per fetch, in seconds.
    pub fetch_timeout_secs: u64,

    /// Timeout per re-extraction inference call, in seconds.
    pub inference_timeout_secs: u64,

    /// Bounded concurrency across records.
    pub concurrency: usize,

    /// Confidence grade assigned to enrichment-filled fields.
    pub fill_confidence: f32,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            thin_description_len: 100,
            fetch_timeout_secs: 5,
            inference_timeout_secs: 60,
            concurrency: 4,
            fill_confidence: 0.5,
        }
    }
}

impl EnrichConfig {
    /// Enable enrichment.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }
}

/// Configuration for cluster analysis.
///
/// The cluster-count heuristic and the assignment tie-break have no ground
/// truth; both bounds and the seed are configuration rather than constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Explicit cluster count. When None, k = clamp(round(sqrt(n/2)), min_k, max_k).
    pub requested_k: Option<usize>,

    pub min_k: usize,

    pub max_k: usize,

    /// Seed for centroid initialisation; fixed so identical input clusters
    /// identically.
    pub seed: u64,

    /// K-Means iteration cap.
    pub max_iterations: usize,

    /// Vocabulary cap for TF-IDF.
    pub max_features: usize,

    /// Terms per cluster label.
    pub label_terms: usize,

    /// Terms in the run-level top-terms list.
    pub top_terms: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            requested_k: None,
            min_k: 2,
            max_k: 10,
            seed: 42,
            max_iterations: 100,
            max_features: 100,
            label_terms: 3,
            top_terms: 10,
        }
    }
}

impl ClusterConfig {
    /// Request an explicit cluster count.
    pub fn with_requested_k(mut self, k: usize) -> Self {
        self.requested_k = Some(k);
        self
    }

    /// Set the initialisation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Resolve k for a given record count.
    pub fn resolve_k(&self, n: usize) -> usize {
        let k = match self.requested_k {
            Some(k) => k.max(1),
            None => {
                let est = ((n as f64 / 2.0).sqrt()).round() as usize;
                est.clamp(self.min_k, self.max_k)
            }
        };
        k.min(n)
    }
}

/// Full configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// The user's research topic, e.g. "AI for SMEs Europe".
    pub topic: String,

    /// Feed category the run is scoped to.
    pub category: SourceCategory,

    pub dataset_source: DatasetSource,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub relevance: RelevanceConfig,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub enrich: EnrichConfig,

    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl RunConfig {
    /// Create a config for a topic with defaults everywhere else.
    pub fn new(topic: impl Into<String>, category: SourceCategory) -> Self {
        Self {
            topic: topic.into(),
            category,
            dataset_source: DatasetSource::None,
            normalize: NormalizeConfig::default(),
            relevance: RelevanceConfig::default(),
            extract: ExtractConfig::default(),
            enrich: EnrichConfig::default(),
            cluster: ClusterConfig::default(),
        }
    }

    /// Set the dataset source.
    pub fn with_dataset_source(mut self, source: DatasetSource) -> Self {
        self.dataset_source = source;
        self
    }

    /// Set the extraction batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.extract.batch_size = batch_size;
        self
    }

    /// Enable enrichment.
    pub fn with_enrichment(mut self) -> Self {
        self.enrich.enabled = true;
        self
    }

    /// Validate invariants that would otherwise surface mid-run.
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(PipelineError::Config("topic must not be empty".into()));
        }
        if self.extract.batch_size == 0 {
            return Err(PipelineError::Config("batch_size must be at least 1".into()));
        }
        if self.extract.concurrency == 0 || self.enrich.concurrency == 0 {
            return Err(PipelineError::Config("concurrency must be at least 1".into()));
        }
        Ok(())
    }
}
