//! Task routing input
//!
//! [`TaskRequest::from_request`] is the validation boundary between the loose
//! JSON body and the prompt router.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::SimplifyRequest;
use std::fmt;
use std::str::FromStr;

use crate::client::ModelChoice;
use crate::error::{AiError, AiResult};

pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_LEVEL: &str = "B1";

/// Rewriting task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    #[default]
    Simplify,
    Summary,
    Verify,
    Bundle,
}

impl Task {
    pub const fn name(&self) -> &'static str {
        match self {
            Task::Simplify => "simplify",
            Task::Summary => "summary",
            Task::Verify => "verify",
            Task::Bundle => "bundle",
        }
    }

    /// Only simplification counts against the free quota
    pub const fn is_metered(&self) -> bool {
        matches!(self, Task::Simplify)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Task {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "simplify" => Ok(Task::Simplify),
            "summary" => Ok(Task::Summary),
            "verify" => Ok(Task::Verify),
            "bundle" => Ok(Task::Bundle),
            other => Err(AiError::Validation(format!("Unknown task: {other}"))),
        }
    }
}

/// Task payload, one variant per [`Task`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInput {
    Simplify(String),
    Summary(String),
    Verify { original: String, simplified: String },
    Bundle { original: String, simplified: String },
}

impl TaskInput {
    pub const fn task(&self) -> Task {
        match self {
            TaskInput::Simplify(_) => Task::Simplify,
            TaskInput::Summary(_) => Task::Summary,
            TaskInput::Verify { .. } => Task::Verify,
            TaskInput::Bundle { .. } => Task::Bundle,
        }
    }
}

/// Validated proxy request
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRequest {
    pub input: TaskInput,
    pub language: String,
    pub level: String,
    /// Raw terms; cleaned when the prompt is built
    pub protected_terms: Vec<String>,
    pub reduction_target: Option<f64>,
    pub model: ModelChoice,
}

impl TaskRequest {
    /// Validate a proxy request body
    pub fn from_request(req: &SimplifyRequest) -> AiResult<Self> {
        let task = match req.task.as_deref() {
            Some(name) => name.parse()?,
            None => Task::default(),
        };

        let text = req.text.as_ref();
        let input = match task {
            Task::Simplify => TaskInput::Simplify(text_input(text)?),
            Task::Summary => TaskInput::Summary(text_input(text)?),
            Task::Verify => {
                let (original, simplified) = pair_input(text)?;
                TaskInput::Verify { original, simplified }
            }
            Task::Bundle => {
                let (original, simplified) = pair_input(text)?;
                TaskInput::Bundle { original, simplified }
            }
        };

        Ok(Self {
            input,
            language: non_blank(req.language.as_deref()).unwrap_or(DEFAULT_LANGUAGE).to_string(),
            level: non_blank(req.level.as_deref()).unwrap_or(DEFAULT_LEVEL).to_string(),
            protected_terms: req.protected_terms(),
            reduction_target: req.reduction_target(),
            model: ModelChoice::from_hint(req.model.as_deref()),
        })
    }

    pub const fn task(&self) -> Task {
        self.input.task()
    }

    /// Drop the reduction target (it is a Pro-only control)
    pub fn without_reduction(mut self) -> Self {
        self.reduction_target = None;
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn text_input(text: Option<&Value>) -> AiResult<String> {
    match text {
        None | Some(Value::Null) => Err(AiError::Required("text")),
        Some(Value::String(s)) if s.trim().is_empty() => Err(AiError::Required("text")),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(AiError::Validation("text must be a string".into())),
    }
}

/// `(original, simplified)` from an object payload
fn pair_input(text: Option<&Value>) -> AiResult<(String, String)> {
    let field = |name: &str| {
        text.and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_owned)
    };

    match (field("original"), field("simplified")) {
        (Some(original), Some(simplified)) => Ok((original, simplified)),
        _ => Err(AiError::Validation(
            "text must be an object with non-empty original and simplified".into(),
        )),
    }
}
