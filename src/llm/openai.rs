//! OpenAI-compatible backend for [`super::LlmClient`], gated behind the `llm` feature.

use super::{ClassificationGuess, LlmClient};
use crate::error::{DocError, Result};
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};

/// Calls an OpenAI-compatible chat completion endpoint.
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    runtime: tokio::runtime::Runtime,
}

impl OpenAiLlmClient {
    /// Builds a client from the standard `OPENAI_API_KEY`/`OPENAI_BASE_URL` environment.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::ModelUnavailable`] if a background runtime cannot be started.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DocError::ModelUnavailable(format!("failed to start runtime: {e}")))?;
        Ok(Self { client: Client::new(), model: model.into(), runtime })
    }

    fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.runtime.block_on(async {
            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages(vec![
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(system)
                        .build()
                        .map_err(|e| DocError::ModelUnavailable(e.to_string()))?
                        .into(),
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(user)
                        .build()
                        .map_err(|e| DocError::ModelUnavailable(e.to_string()))?
                        .into(),
                ])
                .temperature(0.2)
                .build()
                .map_err(|e| DocError::ModelUnavailable(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| DocError::ModelUnavailable(e.to_string()))?;

            response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| DocError::ModelUnavailable("empty completion".to_string()).into())
        })
    }
}

impl LlmClient for OpenAiLlmClient {
    fn classify(&self, text_prefix: &str, filename: &str) -> Result<ClassificationGuess> {
        let system = "Respond with strict JSON only: {\"domain\": string, \"category\": string}. \
             No prose, no markdown fences.";
        let user = format!("Filename: {filename}\n\nText prefix:\n{text_prefix}");
        let raw = self.complete(system, &user)?;
        serde_json::from_str(raw.trim()).map_err(|e| {
            DocError::ClassifyError { path: filename.to_string(), reason: e.to_string() }.into()
        })
    }

    fn answer(&self, prompt: &str, question: &str) -> Result<String> {
        self.complete(prompt, question)
    }
}
