//! Solution generator client
//!
//! Produces a fresh resolution for an incident through the completion
//! service. Callers always get text back: when every attempt fails the
//! generator answers with [`NO_SOLUTION_SENTINEL`].

use crate::completion::TextCompletion;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

/// System prompt for solution generation
pub const GENERATION_SYSTEM_PROMPT: &str =
    "You are an IT support assistant that provides practical resolutions.";

/// Sampling temperature for solution generation
pub const DEFAULT_GENERATION_TEMPERATURE: f32 = 0.3;

/// Returned when no attempt produced a solution
pub const NO_SOLUTION_SENTINEL: &str = "No solution could be generated.";

/// Writes a new resolution for an incident
#[async_trait]
pub trait ResolutionWriter: Send + Sync {
    async fn generate(&self, description: &str, detailed_description: &str) -> String;
}

/// Build the resolution prompt for an incident
pub fn resolution_prompt(description: &str, detailed_description: &str) -> String {
    format!(
        "Incident:\n{}\n{}\n\nProvide a concise IT support resolution (step-by-step if needed).",
        description, detailed_description
    )
}

/// Solution generator backed by a text completion service
#[derive(Clone)]
pub struct SolutionGenerator {
    completion: Arc<dyn TextCompletion>,
    retry: RetryPolicy,
    temperature: f32,
}

impl SolutionGenerator {
    /// Create generator with the default sampling temperature
    pub fn new(completion: Arc<dyn TextCompletion>, retry: RetryPolicy) -> Self {
        Self::with_temperature(completion, retry, DEFAULT_GENERATION_TEMPERATURE)
    }

    /// Create generator with an explicit sampling temperature
    pub fn with_temperature(
        completion: Arc<dyn TextCompletion>,
        retry: RetryPolicy,
        temperature: f32,
    ) -> Self {
        Self {
            completion,
            retry,
            temperature,
        }
    }
}

#[async_trait]
impl ResolutionWriter for SolutionGenerator {
    async fn generate(&self, description: &str, detailed_description: &str) -> String {
        let prompt = resolution_prompt(description, detailed_description);
        let prompt = prompt.as_str();
        let completion = self.completion.as_ref();
        let temperature = self.temperature;

        let result = self
            .retry
            .execute_with_retry(
                "solution generation",
                move || completion.complete(GENERATION_SYSTEM_PROMPT, prompt, temperature),
                |text: &String| !text.trim().is_empty(),
            )
            .await;

        match result {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!(error = %e, "Failed to generate solution after retries");
                NO_SOLUTION_SENTINEL.to_string()
            }
        }
    }
}
