//! AI proxy request/response DTOs
//!
//! `text`, `terms` and `reductionTarget` stay loosely typed here because
//! their shape depends on the task; `simplify-ai` validates them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /api/simplify` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyRequest {
    /// String for simplify/summary, `{original, simplified}` for verify/bundle
    #[serde(default)]
    pub text: Option<Value>,
    /// Model hint: `fast` (default) or `quality`
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    /// Array of strings or a comma-separated string
    #[serde(default)]
    pub terms: Option<Value>,
    #[serde(default)]
    pub reduction_target: Option<Value>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SimplifyRequest {
    /// Raw protected terms as sent; cleaning happens in the prompt router
    pub fn protected_terms(&self) -> Vec<String> {
        match &self.terms {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect(),
            Some(Value::String(list)) => list.split(',').map(str::to_owned).collect(),
            _ => Vec::new(),
        }
    }

    /// Reduction target, only when sent as a JSON number
    pub fn reduction_target(&self) -> Option<f64> {
        self.reduction_target.as_ref().and_then(Value::as_f64)
    }
}

/// Successful proxy response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifyResponse<T> {
    pub result: T,
}
