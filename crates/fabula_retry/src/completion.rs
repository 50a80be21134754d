//! Completion client that waits out outages.

use crate::CooldownRetry;
use fabula_core::Turn;
use fabula_error::FabulaResult;
use fabula_interface::CompletionDriver;

/// Wraps a [`CompletionDriver`] with a cooldown retry.
///
/// Each attempt sends the identical prompt and context. Callers only ever
/// see the text of a successful response, or the final error when the
/// retry is bounded.
#[derive(Debug)]
pub struct ResilientCompletionClient<D> {
    driver: D,
    retry: CooldownRetry,
}

impl<D: CompletionDriver> ResilientCompletionClient<D> {
    /// Wrap `driver` with the given retry policy.
    pub fn new(driver: D, retry: CooldownRetry) -> Self {
        Self { driver, retry }
    }

    /// The wrapped driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Complete `prompt` given `context`, retrying failures.
    #[tracing::instrument(
        skip(self, prompt, context),
        fields(
            provider = self.driver.provider_name(),
            prompt_len = prompt.len(),
            context_turns = context.len()
        )
    )]
    pub async fn complete(&self, prompt: &str, context: &[Turn]) -> FabulaResult<String> {
        let driver = &self.driver;
        let reply = self
            .retry
            .run("completion", move || driver.complete(prompt, context))
            .await?;

        tracing::debug!(reply_len = reply.len(), "Completion succeeded");
        Ok(reply)
    }
}
