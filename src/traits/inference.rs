//! Inference trait for the local LLM service.
//!
//! Implementations wrap a specific model runtime (Ollama, an OpenAI-compatible
//! proxy, a mock) and handle transport details. The pipeline owns prompting
//! and response parsing; the trait stays a plain prompt-in, text-out call.
//!
//! The pipeline does not manage the service's lifecycle (startup, model
//! loading). An unreachable service is reported per call and charged to the
//! batch that made it.

use async_trait::async_trait;

use crate::error::InferenceResult;

/// A prompt-completion interface over a local LLM service.
#[async_trait]
pub trait Inference: Send + Sync {
    /// Send a prompt and return the raw model output.
    ///
    /// The output is free text; callers must treat any structure inside it
    /// as unreliable and parse fallibly.
    async fn complete(&self, prompt: &str) -> InferenceResult<String>;

    /// Model identifier (for logging/debugging).
    fn model(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: Inference + ?Sized> Inference for &T {
    async fn complete(&self, prompt: &str) -> InferenceResult<String> {
        (**self).complete(prompt).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
