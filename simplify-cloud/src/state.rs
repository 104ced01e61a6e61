//! Application state

use simplify_ai::{AiProxy, GeminiBackend, ModelBackend, ModelClient};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::UsageLimiter;
use crate::config::Config;
use crate::services::{EntitlementResolver, InflightRegistry, WebhookIngestor};
use crate::store::{self, Store};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
///
/// The store handle is created once and injected into each component.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub webhooks: WebhookIngestor,
    pub entitlements: EntitlementResolver,
    pub limiter: UsageLimiter,
    pub proxy: AiProxy,
    pub inflight: InflightRegistry,
    /// Lemon Squeezy webhook signing secret
    pub signing_secret: Option<String>,
    /// Whole-request bound applied by the router
    pub request_timeout: Duration,
}

impl AppState {
    /// Connect the store named by `DATABASE_URL` and build the Gemini backend
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store = store::connect(&config.database_url, config.db_max_connections).await?;
        let backend = GeminiBackend::new(&config.gemini_api_base, config.gemini_api_key.clone())?;
        if !backend.is_configured() {
            tracing::warn!("GEMINI_API_KEY not set, /api/simplify will answer 500");
        }
        Ok(Self::from_parts(config, store, Arc::new(backend)))
    }

    /// Assemble state from an existing store and model backend
    pub fn from_parts(config: &Config, store: Arc<dyn Store>, backend: Arc<dyn ModelBackend>) -> Self {
        let proxy = AiProxy::new(ModelClient::new(backend, config.model_config()));

        Self {
            webhooks: WebhookIngestor::new(store.clone(), config.target_variant_id),
            entitlements: EntitlementResolver::new(store.clone(), config.target_variant_id),
            limiter: UsageLimiter::new(store.clone(), config.free_daily_limit),
            store,
            proxy,
            inflight: InflightRegistry::new(),
            signing_secret: config.signing_secret.clone(),
            request_timeout: config.request_timeout(),
        }
    }
}
