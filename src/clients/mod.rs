//! Reference implementations of the collaborator traits.
//!
//! These are conveniences; users can implement [`crate::traits::Inference`]
//! and [`crate::traits::PageFetcher`] against whatever backend they run.

#[cfg(feature = "ollama")]
mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::OllamaClient;
