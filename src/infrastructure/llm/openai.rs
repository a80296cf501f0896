use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai;
use std::time::Duration;
use tracing::instrument;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;

/// OpenAI completions through rig. Reads `OPENAI_API_KEY` on construction.
pub struct OpenAiLlm {
    client: openai::Client,
    model: String,
    timeout: Duration,
}

impl OpenAiLlm {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: openai::Client::from_env(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[async_trait]
impl LlmService for OpenAiLlm {
    #[instrument(skip(self, system, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        let agent = self.client.agent(&self.model).preamble(system).build();

        tokio::time::timeout(self.timeout, agent.prompt(prompt))
            .await
            .map_err(|_| DomainError::timeout("Completion timed out"))?
            .map_err(|e| DomainError::external(e.to_string()))
    }
}
