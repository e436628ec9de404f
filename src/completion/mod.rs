//! Text completion port
//!
//! The oracle and generator clients only need one capability from the
//! reasoning service: turn a system prompt plus a user prompt into text.
//! Keeping that behind a trait lets tests drive both clients with
//! deterministic stand-ins instead of live network calls.

pub mod client;

pub use client::{ChatCompletionClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

use crate::errors::Result;
use async_trait::async_trait;

/// A single request/response call to an external text-reasoning service
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Complete `user_prompt` under `system_prompt` at the given sampling temperature
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String>;
}
