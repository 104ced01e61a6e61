//! AI proxy orchestration
//!
//! Turns a validated [`TaskRequest`] into a prompt, calls the upstream model
//! (with a single quality → fast fallback) and parses the free-form reply
//! into a structured [`ParsedResult`].
//!
//! ```text
//! SimplifyRequest ─► TaskRequest ─► PromptSpec ─► ModelClient ─► parse() ─► ParsedResult
//!                    (task.rs)      (prompt.rs)   (client.rs)    (parse.rs)
//! ```

pub mod client;
pub mod error;
pub mod gemini;
pub mod parse;
pub mod prompt;
pub mod proxy;
pub mod task;

pub use client::{Generation, ModelBackend, ModelChoice, ModelClient, ModelConfig};
pub use error::{AiError, AiResult};
pub use gemini::GeminiBackend;
pub use parse::{Bundle, MeaningCheck, ParsedResult, Risk, parse, recover_meaning};
pub use prompt::{PromptSpec, build_prompt};
pub use proxy::AiProxy;
pub use task::{Task, TaskInput, TaskRequest};
