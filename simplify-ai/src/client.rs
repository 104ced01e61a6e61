//! Model Client
//!
//! Model selection plus the single quality → fast fallback. The transport is
//! abstracted behind [`ModelBackend`] so the chain runs without the network
//! in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{AiError, AiResult};
use crate::prompt::PromptSpec;

pub const DEFAULT_FAST_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_QUALITY_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Model tier requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    #[default]
    Fast,
    Quality,
}

impl ModelChoice {
    /// `"quality"` selects [`ModelChoice::Quality`]; anything else is fast
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(str::trim) {
            Some(h) if h.eq_ignore_ascii_case("quality") => ModelChoice::Quality,
            _ => ModelChoice::Fast,
        }
    }
}

/// Upstream text generation transport
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Whether credentials are present
    fn is_configured(&self) -> bool;

    /// One generation call against `model`
    async fn generate(&self, model: &str, spec: &PromptSpec) -> AiResult<String>;

    /// Upstream model catalog, passed through as-is
    async fn list_models(&self) -> AiResult<Value>;
}

/// Model names and call bound
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub fast_model: String,
    pub quality_model: String,
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            quality_model: DEFAULT_QUALITY_MODEL.to_string(),
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

/// Successful generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    /// Model that produced `text`
    pub model: String,
    pub fell_back: bool,
}

#[derive(Clone)]
pub struct ModelClient {
    backend: Arc<dyn ModelBackend>,
    config: ModelConfig,
}

impl ModelClient {
    pub fn new(backend: Arc<dyn ModelBackend>, config: ModelConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &Arc<dyn ModelBackend> {
        &self.backend
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn model_for(&self, choice: ModelChoice) -> &str {
        match choice {
            ModelChoice::Fast => &self.config.fast_model,
            ModelChoice::Quality => &self.config.quality_model,
        }
    }

    /// Generate with the chosen model; a failed quality call is retried once
    /// on the fast model with the same prompt. Fast failures surface as-is.
    pub async fn generate(
        &self,
        spec: &PromptSpec,
        choice: ModelChoice,
        cancel: &CancellationToken,
    ) -> AiResult<Generation> {
        let primary = self.model_for(choice);
        match self.call(primary, spec, cancel).await {
            Ok(text) => Ok(Generation {
                text,
                model: primary.to_string(),
                fell_back: false,
            }),
            Err(err) if choice == ModelChoice::Quality && err.is_fallback_eligible() => {
                let fast = self.model_for(ModelChoice::Fast);
                tracing::warn!(
                    model = %primary,
                    fallback = %fast,
                    error = %err,
                    "Quality model failed, falling back"
                );
                let text = self.call(fast, spec, cancel).await?;
                Ok(Generation {
                    text,
                    model: fast.to_string(),
                    fell_back: true,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// One bounded, cancellable backend call
    async fn call(&self, model: &str, spec: &PromptSpec, cancel: &CancellationToken) -> AiResult<String> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AiError::Cancelled),
            result = tokio::time::timeout(self.config.timeout, self.backend.generate(model, spec)) => {
                match result {
                    Ok(inner) => inner,
                    Err(_) => {
                        tracing::warn!(model = %model, timeout_secs = self.config.timeout.as_secs(), "Upstream call timed out");
                        Err(AiError::Timeout)
                    }
                }
            }
        }
    }
}
