//! Test doubles for the collaborator traits.
//!
//! Both mocks are script-driven: responses are queued up front and consumed
//! in call order, with an optional default once the queue runs dry. All
//! state sits behind `Arc<RwLock<..>>` so a mock can be cloned into
//! concurrent tasks and still report its calls afterwards.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult, InferenceError, InferenceResult};
use crate::traits::fetcher::{FetchRequest, PageFetcher};
use crate::traits::inference::Inference;

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
struct InferenceState {
    scripted: VecDeque<InferenceResult<String>>,
    default_response: Option<String>,
    calls: Vec<String>,
}

/// Scripted [`Inference`] implementation.
#[derive(Clone, Default)]
pub struct MockInference {
    state: Arc<RwLock<InferenceState>>,
}

impl MockInference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        write_lock(&self.state).scripted.push_back(Ok(response.into()));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, error: InferenceError) -> Self {
        write_lock(&self.state).scripted.push_back(Err(error));
        self
    }

    /// Response returned once the scripted queue is exhausted.
    pub fn with_default_response(self, response: &str) -> Self {
        write_lock(&self.state).default_response = Some(response.to_string());
        self
    }

    /// Prompts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        read_lock(&self.state).calls.clone()
    }
}

#[async_trait]
impl Inference for MockInference {
    async fn complete(&self, prompt: &str) -> InferenceResult<String> {
        let mut state = write_lock(&self.state);
        state.calls.push(prompt.to_string());
        match state.scripted.pop_front() {
            Some(result) => result,
            None => Ok(state
                .default_response
                .clone()
                .unwrap_or_else(|| "[]".to_string())),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}

#[derive(Default)]
struct FetcherState {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    calls: Vec<FetchRequest>,
}

/// Canned-page [`PageFetcher`] implementation, keyed by request name.
#[derive(Clone, Default)]
pub struct MockFetcher {
    state: Arc<RwLock<FetcherState>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` for requests named `name`.
    pub fn with_page(self, name: &str, text: &str) -> Self {
        write_lock(&self.state)
            .pages
            .insert(name.to_string(), text.to_string());
        self
    }

    /// Make requests named `name` fail as unreachable.
    pub fn failing(self, name: &str) -> Self {
        write_lock(&self.state).failing.insert(name.to_string());
        self
    }

    /// Requests received so far, in call order.
    pub fn calls(&self) -> Vec<FetchRequest> {
        read_lock(&self.state).calls.clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String> {
        let mut state = write_lock(&self.state);
        state.calls.push(request.clone());

        if state.failing.contains(&request.name) {
            return Err(FetchError::Unreachable(format!(
                "scripted failure for '{}'",
                request.name
            )));
        }
        match state.pages.get(&request.name) {
            Some(text) => Ok(text.clone()),
            None => Err(FetchError::Unreachable(format!(
                "no page configured for '{}'",
                request.name
            ))),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
