//! Secondary model call: drafting quiz questions for a topic
//!
//! Runs only when a quiz is created with a topic (or generation is
//! explicitly requested). Failure here is reported to the caller as an
//! error, but the quiz-creation handler absorbs it: a quiz without
//! generated questions is still a successful creation.

use crate::core::error::{CopilotError, Result};
use crate::llm::LanguageModel;
use serde::Deserialize;

/// A model-drafted multiple-choice question, not yet persisted
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub answer: usize,
}

#[derive(Deserialize)]
struct GenerationResponse {
    questions: Vec<GeneratedQuestion>,
}

/// Ask the model for `count` multiple-choice questions on `topic`
pub async fn generate_questions(
    model: &dyn LanguageModel,
    topic: &str,
    count: u32,
) -> Result<Vec<GeneratedQuestion>> {
    let user_prompt = format!(
        "TOPIC: {}\nNUMBER OF QUESTIONS: {}\n\nWrite the questions as JSON:",
        topic, count
    );
    let response = model.generate(QUESTION_SYSTEM_PROMPT, &user_prompt).await?;
    parse_questions(&response)
}

fn parse_questions(response: &str) -> Result<Vec<GeneratedQuestion>> {
    let start = response
        .find('{')
        .ok_or_else(|| CopilotError::ModelError("No JSON in question response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| CopilotError::ModelError("No closing brace in question response".into()))?;

    let parsed: GenerationResponse = serde_json::from_str(&response[start..=end])
        .map_err(|e| CopilotError::ModelError(format!("Bad question payload: {}", e)))?;

    let questions: Vec<GeneratedQuestion> = parsed
        .questions
        .into_iter()
        .filter(|q| !q.options.is_empty() && q.answer < q.options.len())
        .collect();

    if questions.is_empty() {
        return Err(CopilotError::ModelError(
            "Model produced no usable questions".into(),
        ));
    }
    Ok(questions)
}

const QUESTION_SYSTEM_PROMPT: &str = r#"You write multiple-choice quiz questions for a course platform.
Each question has exactly four options and one correct answer.

OUTPUT FORMAT (JSON only, no explanation):
{
  "questions": [
    {"prompt": "...", "options": ["...", "...", "...", "..."], "answer": 0}
  ]
}

"answer" is the zero-based index of the correct option. Keep prompts short and factual.
"#;
