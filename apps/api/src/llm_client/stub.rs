//! In-memory gateway for tests. Records every completion request.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm_client::{
    Completion, CompletionProfile, CompletionRequest, LlmError, ModelGateway, ProviderModel, Usage,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub model: String,
    pub profile: CompletionProfile,
}

pub enum StubReply {
    Text(String),
    MissingApiKey,
    Upstream { status: u16, message: String },
}

pub struct StubGateway {
    reply: StubReply,
    models: Vec<ProviderModel>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubGateway {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_reply(StubReply::Text(text.into()))
    }

    pub fn with_reply(reply: StubReply) -> Self {
        Self {
            reply,
            models: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_models(mut self, ids: &[&str]) -> Self {
        self.models = ids
            .iter()
            .map(|id| ProviderModel {
                id: id.to_string(),
                details: Default::default(),
            })
            .collect();
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn failure(&self) -> Option<LlmError> {
        match &self.reply {
            StubReply::Text(_) => None,
            StubReply::MissingApiKey => Some(LlmError::MissingApiKey),
            StubReply::Upstream { status, message } => Some(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

#[async_trait]
impl ModelGateway for StubGateway {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: request.prompt.to_string(),
            model: request.model.to_string(),
            profile: request.profile,
        });

        if let Some(err) = self.failure() {
            return Err(err);
        }
        let StubReply::Text(text) = &self.reply else {
            unreachable!("non-text replies are failures");
        };
        Ok(Completion {
            text: text.clone(),
            usage: Some(Usage {
                prompt_tokens: Some(100),
                completion_tokens: Some(50),
                total_tokens: Some(150),
                extra: Default::default(),
            }),
        })
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, LlmError> {
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(self.models.clone()),
        }
    }

    async fn key_status(&self) -> Result<Value, LlmError> {
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(serde_json::json!({"label": "test-key", "usage": 0})),
        }
    }
}
