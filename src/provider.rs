//! The provider abstraction over LLM backends.
//!
//! Only one backend exists today (OpenAI-compatible chat completions), but
//! the CLI talks to it through [`LlmProvider`] so future backends slot in
//! without touching the decoder or the endpoint resolver.

use async_trait::async_trait;

use crate::client::OpenAi;
use crate::config::Config;
use crate::error::Result;

/// Per-fragment callback used by [`LlmProvider::ask_stream`].
pub type ChunkCallback<'a> = &'a mut (dyn FnMut(&str) -> Result<()> + Send);

/// A backend that can answer a question, streamed or buffered.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a question and return the complete answer.
    async fn ask(&self, question: &str) -> Result<String>;

    /// Send a question and invoke the callback for every answer fragment,
    /// in order. An error from the callback stops the stream and propagates.
    async fn ask_stream(&self, question: &str, on_chunk: ChunkCallback<'_>) -> Result<()>;
}

#[async_trait]
impl LlmProvider for OpenAi {
    async fn ask(&self, question: &str) -> Result<String> {
        OpenAi::ask(self, question).await
    }

    async fn ask_stream(&self, question: &str, on_chunk: ChunkCallback<'_>) -> Result<()> {
        OpenAi::ask_stream(self, question, on_chunk).await
    }
}

/// Create the provider selected by the configuration.
///
/// OpenAI-compatible is the sole implementation for now.
pub fn provider_for(config: &Config) -> Result<Box<dyn LlmProvider>> {
    let client = OpenAi::new(config.llm.openai.clone())?;
    Ok(Box::new(client))
}
