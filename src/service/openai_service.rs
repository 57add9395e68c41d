use async_trait::async_trait;

use crate::clients::openai_client::{ChatMessage, OpenAIChatClient};
use crate::error::ModelError;

/// Seam between the pipeline and the completion provider. Tests swap in
/// canned implementations.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ModelError>;
}

pub struct OpenAIService {
    client: OpenAIChatClient,
}

impl OpenAIService {
    pub fn new(client: OpenAIChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatModel for OpenAIService {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ModelError> {
        self.client.complete(messages).await
    }
}
