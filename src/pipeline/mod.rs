//! The discovery pipeline stages and their orchestrator.
//!
//! Each stage is a standalone function taking the previous stage's output
//! plus its own config; [`run::Pipeline`] wires them together. Stages never
//! reach around each other, which keeps every one testable in isolation.

pub mod enrich;
pub mod extract;
pub mod normalize;
pub mod prompts;
pub mod relevance;
pub mod run;

pub use enrich::{enrich_records, EnrichOutcome};
pub use extract::{extract_startups, ExtractOutcome};
pub use normalize::{normalize, NormalizeOutcome};
pub use prompts::{
    format_enrich_prompt, format_extract_prompt, parse_enrich_response, parse_extract_response,
    RawStartupItem,
};
pub use relevance::{filter_relevant, RelevanceDecision, RelevanceOutcome};
pub use run::{Pipeline, SourceSet};
