//! End-to-end proxy pipeline: prompt → model → parse

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::ModelClient;
use crate::error::{AiError, AiResult};
use crate::parse::{ParsedResult, parse};
use crate::prompt::build_prompt;
use crate::task::TaskRequest;

#[derive(Clone)]
pub struct AiProxy {
    client: ModelClient,
}

impl AiProxy {
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ModelClient {
        &self.client
    }

    /// Fails with a configuration error when no upstream credential is set
    pub fn ensure_configured(&self) -> AiResult<()> {
        if self.client.backend().is_configured() {
            Ok(())
        } else {
            Err(AiError::Config("GEMINI_API_KEY"))
        }
    }

    /// Run one validated request through the model
    pub async fn run(&self, request: &TaskRequest, cancel: &CancellationToken) -> AiResult<ParsedResult> {
        let spec = build_prompt(request);
        let generation = self.client.generate(&spec, request.model, cancel).await?;

        tracing::info!(
            task = %request.task(),
            model = %generation.model,
            fell_back = generation.fell_back,
            "Generation completed"
        );

        Ok(parse(request.task(), &generation.text))
    }

    /// Upstream model catalog
    pub async fn list_models(&self) -> AiResult<Value> {
        self.ensure_configured()?;
        self.client.backend().list_models().await
    }
}
