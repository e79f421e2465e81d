//! Startup Signal Discovery Pipeline
//!
//! A library that turns heterogeneous startup news sources into a clustered
//! market map: normalize raw feed entries and dataset rows into articles,
//! pre-filter for relevance, extract structured startup records with a local
//! LLM, optionally enrich thin records from the web, then group the result
//! with TF-IDF + K-Means and summarize it.
//!
//! # Design Philosophy
//!
//! **Best partial answer, visible caveats**
//!
//! - Collaborator-owned I/O: feeds, the model, and the web sit behind traits
//! - A failed batch costs its batch, never the run
//! - Deterministic output for identical input (seeded clustering, stable order)
//! - Everything a run learns, including failures, lands on one report
//!
//! # Usage
//!
//! ```rust,ignore
//! use marketmap::{Pipeline, RunConfig, SourceCategory, SourceSet};
//! use marketmap::testing::{MockFetcher, MockInference};
//! use tokio_util::sync::CancellationToken;
//!
//! let pipeline = Pipeline::new(MockInference::new(), MockFetcher::new());
//! let config = RunConfig::new("AI for SMEs Europe", SourceCategory::AiDeepTech);
//!
//! let report = pipeline
//!     .run(&config, SourceSet::from_feeds(entries), &CancellationToken::new())
//!     .await?;
//! println!("{}", report.insights.unwrap().headline());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions (Inference, PageFetcher)
//! - [`types`] - Domain data types and configuration
//! - [`pipeline`] - The five stages and the run orchestrator
//! - [`cluster`] - TF-IDF vectorization, seeded K-Means, insights
//! - [`testing`] - Mock implementations for testing

pub mod cluster;
pub mod error;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "ollama")]
pub mod clients;

// Re-export core types at crate root
pub use error::{FetchError, InferenceError, PipelineError};
pub use traits::{FetchRequest, Inference, PageFetcher};
pub use types::{
    article::{Article, Origin, RawDatasetRow, RawFeedEntry},
    cluster::{ClusterAssignment, InsightSummary},
    config::{
        ClusterConfig, DatasetSource, EnrichConfig, ExtractConfig, FeedCatalog, NormalizeConfig,
        RelevanceConfig, RunConfig, SourceCategory,
    },
    record::{AttributeConfidence, Category, StartupRecord},
    report::{BatchFailure, RunReport, RunStatus, RunWarning},
};

// Re-export pipeline components
pub use pipeline::{
    enrich_records, extract_startups, filter_relevant, normalize, EnrichOutcome, ExtractOutcome,
    NormalizeOutcome, Pipeline, RelevanceOutcome, SourceSet,
};

// Re-export cluster analysis
pub use cluster::{analyze, ClusterOutcome};

// Re-export testing utilities
pub use testing::{MockFetcher, MockInference};

#[cfg(feature = "ollama")]
pub use clients::OllamaClient;
