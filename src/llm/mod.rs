//! Client side of the external text generation service.
//!
//! The orchestrator only needs "prompt in, text out", so the seam is a single
//! async method. [`GeminiClient`] talks to the real API; the other
//! implementations cover the unconfigured case and tests.

mod gemini;

pub use gemini::GeminiClient;

use std::sync::Mutex;

use async_trait::async_trait;

/// One prompt, one complete reply. No streaming, no retries.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Used when no API key is configured. Every call fails.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!("text generation is not configured (GEMINI_API_KEY missing)")
    }
}

/// Answers every prompt with the same text and remembers what it was asked.
pub struct StaticReply {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl StaticReply {
    pub fn ok(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for StaticReply {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(msg) => Err(anyhow::anyhow!("{}", msg)),
        }
    }
}
