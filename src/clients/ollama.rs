//! Ollama implementation of the Inference trait.
//!
//! A reference implementation against a local Ollama server.
//!
//! # Example
//!
//! ```rust,ignore
//! use marketmap::clients::OllamaClient;
//!
//! let inference = OllamaClient::new().with_model("mistral");
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{InferenceError, InferenceResult};
use crate::traits::inference::Inference;

/// Inference backed by a local Ollama server's `/api/generate` endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaClient {
    /// Create a client against the default local server.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
        }
    }

    /// Set the model (default: mistral).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Inference for OllamaClient {
    async fn complete(&self, prompt: &str) -> InferenceResult<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(InferenceError::Unavailable(format!(
                "ollama returned {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Malformed(e.to_string()))?;
        Ok(body.response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
