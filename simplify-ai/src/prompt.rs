//! Prompt Router
//!
//! Maps a [`TaskRequest`] to the prompt text and generation settings sent
//! upstream.

use crate::task::{Task, TaskInput, TaskRequest};

/// At most this many protected terms are listed in the prompt
pub const MAX_PROTECTED_TERMS: usize = 20;
/// Reduction targets are clamped to `0..=MAX_REDUCTION_PERCENT`
pub const MAX_REDUCTION_PERCENT: f64 = 70.0;
pub const TEMPERATURE: f32 = 0.3;

/// Prompt plus generation settings
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub prompt_text: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// Output token cap per task
pub const fn max_output_tokens(task: Task) -> u32 {
    match task {
        Task::Summary => 256,
        Task::Bundle => 384,
        Task::Simplify | Task::Verify => 512,
    }
}

/// Trim terms, drop blanks, keep the first [`MAX_PROTECTED_TERMS`]
pub fn clean_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .take(MAX_PROTECTED_TERMS)
        .map(str::to_owned)
        .collect()
}

/// Clamp a reduction target to `[0, 70]` and round it
pub fn effective_reduction(target: f64) -> Option<u32> {
    if !target.is_finite() {
        return None;
    }
    Some(target.clamp(0.0, MAX_REDUCTION_PERCENT).round() as u32)
}

/// Build the upstream prompt for a request
pub fn build_prompt(req: &TaskRequest) -> PromptSpec {
    let prompt_text = match &req.input {
        TaskInput::Simplify(text) => simplify_prompt(req, text),
        TaskInput::Summary(text) => summary_prompt(req, text),
        TaskInput::Verify { original, simplified } => verify_prompt(req, original, simplified),
        TaskInput::Bundle { original, simplified } => bundle_prompt(req, original, simplified),
    };

    PromptSpec {
        prompt_text,
        max_output_tokens: max_output_tokens(req.task()),
        temperature: TEMPERATURE,
    }
}

fn simplify_prompt(req: &TaskRequest, text: &str) -> String {
    let mut prompt = format!(
        "Rewrite the following text in simple {language} at CEFR level {level}. \
         Keep the original meaning, facts, names and numbers. \
         Use short sentences and common words. \
         Return only the rewritten text.\n",
        language = req.language,
        level = req.level,
    );

    let terms = clean_terms(&req.protected_terms);
    if !terms.is_empty() {
        prompt.push_str(&format!(
            "Keep these terms exactly as written: {}.\n",
            terms.join(", ")
        ));
    }

    if let Some(percent) = req.reduction_target.and_then(effective_reduction) {
        prompt.push_str(&format!(
            "Make the result about {percent}% shorter than the original.\n"
        ));
    }

    prompt.push_str("\nText:\n");
    prompt.push_str(text);
    prompt
}

fn summary_prompt(req: &TaskRequest, text: &str) -> String {
    format!(
        "Summarize the following text in {language} as 3-5 short bullet points \
         at CEFR level {level}. Return only the bullet points, one per line.\n\
         \nText:\n{text}",
        language = req.language,
        level = req.level,
    )
}

fn verify_prompt(req: &TaskRequest, original: &str, simplified: &str) -> String {
    format!(
        "Compare the ORIGINAL text with the SIMPLIFIED text and judge whether the \
         simplified text preserves the meaning of the original. \
         Respond with JSON only, no code fences, in this shape: \
         {{\"match\": true or false, \"risk\": \"low\" | \"medium\" | \"high\", \"notes\": \"...\"}}. \
         Write the notes in {language}.\n\
         \nORIGINAL:\n{original}\n\
         \nSIMPLIFIED:\n{simplified}",
        language = req.language,
    )
}

fn bundle_prompt(req: &TaskRequest, original: &str, simplified: &str) -> String {
    format!(
        "You receive an ORIGINAL text and its SIMPLIFIED version. \
         1) Summarize the simplified text as 3-5 short bullet points in {language} \
         at CEFR level {level}. \
         2) Judge whether the simplified text preserves the meaning of the original. \
         Respond with JSON only, no code fences, in this shape: \
         {{\"summary\": [\"...\"], \"meaning\": {{\"match\": true or false, \
         \"risk\": \"low\" | \"medium\" | \"high\", \"notes\": \"...\"}}}}.\n\
         \nORIGINAL:\n{original}\n\
         \nSIMPLIFIED:\n{simplified}",
        language = req.language,
        level = req.level,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ModelChoice;

    fn simplify(terms: Vec<String>, reduction_target: Option<f64>) -> TaskRequest {
        TaskRequest {
            input: TaskInput::Simplify("The quick brown fox.".into()),
            language: "English".into(),
            level: "B1".into(),
            protected_terms: terms,
            reduction_target,
            model: ModelChoice::Fast,
        }
    }

    fn pair(task: Task) -> TaskRequest {
        let (original, simplified) = ("Original text".to_string(), "Simple text".to_string());
        let input = match task {
            Task::Verify => TaskInput::Verify { original, simplified },
            Task::Bundle => TaskInput::Bundle { original, simplified },
            other => panic!("{other} takes a single text"),
        };
        TaskRequest {
            input,
            ..simplify(Vec::new(), None)
        }
    }

    #[test]
    fn test_effective_reduction_clamps_and_rounds() {
        assert_eq!(effective_reduction(85.0), Some(70));
        assert_eq!(effective_reduction(-5.0), Some(0));
        assert_eq!(effective_reduction(33.6), Some(34));
        assert_eq!(effective_reduction(f64::NAN), None);
    }

    #[test]
    fn test_clean_terms_caps_at_twenty() {
        let terms: Vec<String> = (0..25).map(|i| format!(" term{i} ")).collect();
        let cleaned = clean_terms(&terms);
        assert_eq!(cleaned.len(), 20);
        assert_eq!(cleaned[0], "term0");
        assert_eq!(cleaned[19], "term19");

        let cleaned = clean_terms(&["".into(), "  ".into(), "API".into()]);
        assert_eq!(cleaned, vec!["API"]);
    }

    #[test]
    fn test_simplify_prompt_clauses() {
        let spec = build_prompt(&simplify(Vec::new(), None));
        assert!(spec.prompt_text.contains("simple English at CEFR level B1"));
        assert!(!spec.prompt_text.contains("exactly as written"));
        assert!(!spec.prompt_text.contains("shorter"));
        assert!(spec.prompt_text.ends_with("The quick brown fox."));
        assert_eq!(spec.max_output_tokens, 512);
        assert_eq!(spec.temperature, 0.3);

        let spec = build_prompt(&simplify(vec!["API".into(), " ".into(), "Rust".into()], Some(85.0)));
        assert!(spec.prompt_text.contains("exactly as written: API, Rust."));
        assert!(spec.prompt_text.contains("about 70% shorter"));
    }

    #[test]
    fn test_prompt_lists_first_twenty_terms() {
        let terms: Vec<String> = (0..25).map(|i| format!("t{i}")).collect();
        let spec = build_prompt(&simplify(terms, None));
        assert!(spec.prompt_text.contains("t19."));
        assert!(!spec.prompt_text.contains("t20"));
    }

    #[test]
    fn test_token_caps_per_task() {
        let mut summary = simplify(Vec::new(), None);
        summary.input = TaskInput::Summary("The quick brown fox.".into());
        assert_eq!(build_prompt(&summary).max_output_tokens, 256);
        assert_eq!(build_prompt(&pair(Task::Bundle)).max_output_tokens, 384);
        assert_eq!(build_prompt(&pair(Task::Verify)).max_output_tokens, 512);
    }

    #[test]
    fn test_pair_prompts_embed_both_texts() {
        for task in [Task::Verify, Task::Bundle] {
            let text = build_prompt(&pair(task)).prompt_text;
            assert!(text.contains("ORIGINAL:\nOriginal text"));
            assert!(text.contains("SIMPLIFIED:\nSimple text"));
            assert!(text.contains("\"match\""));
        }
        assert!(build_prompt(&pair(Task::Bundle)).prompt_text.contains("\"summary\""));
    }
}
