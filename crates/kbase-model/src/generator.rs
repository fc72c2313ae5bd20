use async_trait::async_trait;

use kbase_core::error::Result;
use kbase_core::traits::Generator;

use crate::client::OllamaClient;

/// Non-streaming completions from one model on the model server.
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
}

impl OllamaGenerator {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self { client, model: model.into() }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client.generate(&self.model, prompt).await
    }
}
