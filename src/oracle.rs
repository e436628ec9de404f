//! Similarity oracle client
//!
//! Asks the completion service whether two incident descriptions refer to the
//! same underlying issue. Only an exact "YES" (after trimming and uppercasing)
//! counts as a match; anything else, including service exhaustion, is "NO".

use crate::completion::TextCompletion;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// System prompt for similarity checks
pub const SIMILARITY_SYSTEM_PROMPT: &str = "You are an assistant for comparing IT incidents.";

/// Sampling temperature for similarity checks
pub const DEFAULT_SIMILARITY_TEMPERATURE: f32 = 0.0;

/// Decides whether two incident texts describe the same issue
#[async_trait]
pub trait SimilarityJudge: Send + Sync {
    async fn are_same(&self, text_a: &str, text_b: &str) -> bool;
}

/// Build the comparison prompt for two incidents
pub fn similarity_prompt(incident_a: &str, incident_b: &str) -> String {
    format!(
        r#"You are an assistant that checks whether two IT incidents describe the SAME issue.

Incident A:
{}

Incident B:
{}

Respond with ONLY one word:
- "YES" if they are essentially the same incident
- "NO" if they are different
"#,
        incident_a, incident_b
    )
}

/// Interpret the oracle's reply
pub fn parse_verdict(reply: &str) -> bool {
    reply.trim().to_uppercase() == "YES"
}

/// Similarity oracle backed by a text completion service
#[derive(Clone)]
pub struct SimilarityOracle {
    completion: Arc<dyn TextCompletion>,
    retry: RetryPolicy,
    temperature: f32,
}

impl SimilarityOracle {
    /// Create oracle with deterministic sampling
    pub fn new(completion: Arc<dyn TextCompletion>, retry: RetryPolicy) -> Self {
        Self::with_temperature(completion, retry, DEFAULT_SIMILARITY_TEMPERATURE)
    }

    /// Create oracle with an explicit sampling temperature
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
impl SimilarityJudge for SimilarityOracle {
    async fn are_same(&self, text_a: &str, text_b: &str) -> bool {
        let prompt = similarity_prompt(text_a, text_b);
        let prompt = prompt.as_str();
        let completion = self.completion.as_ref();
        let temperature = self.temperature;

        let result = self
            .retry
            .execute_with_retry(
                "similarity check",
                move || completion.complete(SIMILARITY_SYSTEM_PROMPT, prompt, temperature),
                |_| true,
            )
            .await;

        match result {
            Ok(reply) => {
                let same = parse_verdict(&reply);
                debug!(verdict = same, reply = reply.trim(), "similarity verdict");
                same
            }
            Err(e) => {
                error!(error = %e, "Failed to check similarity after retries");
                false
            }
        }
    }
}
