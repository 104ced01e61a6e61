//! Service configuration
//!
//! All environment reads happen here, once, at startup. Credentials are
//! optional at load time; the endpoints that need them answer with a
//! configuration error when they are missing.

use simplify_ai::client::{DEFAULT_FAST_MODEL, DEFAULT_QUALITY_MODEL, DEFAULT_UPSTREAM_TIMEOUT};
use simplify_ai::gemini::DEFAULT_API_BASE;
use simplify_ai::ModelConfig;
use shared::models::DEFAULT_FREE_DAILY_LIMIT;
use std::str::FromStr;
use std::time::Duration;

use crate::store::MEMORY_URL_SCHEME;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL, or `memory://`
    pub database_url: String,
    pub db_max_connections: u32,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Lemon Squeezy webhook signing secret
    pub signing_secret: Option<String>,
    /// Only subscriptions of this variant are stored and honoured
    pub target_variant_id: Option<i64>,
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub fast_model: String,
    pub quality_model: String,
    /// Bound for one upstream model call
    pub upstream_timeout: Duration,
    pub free_daily_limit: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: MEMORY_URL_SCHEME.to_string(),
            db_max_connections: 5,
            http_port: 8080,
            environment: "development".into(),
            signing_secret: None,
            target_variant_id: None,
            gemini_api_key: None,
            gemini_api_base: DEFAULT_API_BASE.into(),
            fast_model: DEFAULT_FAST_MODEL.into(),
            quality_model: DEFAULT_QUALITY_MODEL.into(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            free_daily_limit: DEFAULT_FREE_DAILY_LIMIT,
        }
    }
}

/// Non-empty env var
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env_opt(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let defaults = Self::default();

        Ok(Self {
            database_url: env_opt("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            http_port: env_parse("HTTP_PORT", defaults.http_port),
            environment: env_opt("ENVIRONMENT").unwrap_or(defaults.environment),
            signing_secret: env_opt("LEMON_SQUEEZY_SIGNING_SECRET"),
            // 0 means "no filter"
            target_variant_id: env_opt("LEMON_SQUEEZY_VARIANT_ID")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|id| *id != 0),
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_api_base: env_opt("GEMINI_API_BASE").unwrap_or(defaults.gemini_api_base),
            fast_model: env_opt("GEMINI_FAST_MODEL").unwrap_or(defaults.fast_model),
            quality_model: env_opt("GEMINI_QUALITY_MODEL").unwrap_or(defaults.quality_model),
            upstream_timeout: Duration::from_secs(env_parse(
                "UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout.as_secs(),
            )),
            free_daily_limit: env_parse("FREE_DAILY_LIMIT", defaults.free_daily_limit),
        })
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            fast_model: self.fast_model.clone(),
            quality_model: self.quality_model.clone(),
            timeout: self.upstream_timeout,
        }
    }

    /// Whole-request bound: a quality call, its fallback, and some slack
    pub fn request_timeout(&self) -> Duration {
        self.upstream_timeout * 2 + Duration::from_secs(5)
    }
}
