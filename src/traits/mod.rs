//! Core trait abstractions for external collaborators.
//!
//! The pipeline never talks to the network or a model runtime directly;
//! it goes through these seams:
//!
//! - [`inference::Inference`] - the local LLM service used for extraction
//! - [`fetcher::PageFetcher`] - the web-fetch collaborator used for enrichment

pub mod fetcher;
pub mod inference;

pub use fetcher::{FetchRequest, PageFetcher};
pub use inference::Inference;
