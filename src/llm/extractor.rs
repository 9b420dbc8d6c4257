//! Intent extraction: free text in, ordered task list out
//!
//! One model call per command, no retries at this layer. The response is
//! treated as hostile input: we locate the first top-level JSON object and
//! walk a repair ladder, so a malformed response degrades to a single
//! `unknown` task instead of failing the command. Only a transport error
//! from the model call itself propagates.

use crate::core::error::Result;
use crate::llm::{LanguageModel, PlatformContext};
use crate::model::command::DataMap;
use serde_json::Value;

/// One unit of work as the model described it, before validation
#[derive(Debug, Clone)]
pub struct RawTask {
    pub intent: String,
    pub parameters: DataMap,
}

impl RawTask {
    fn unknown(message: &str) -> Self {
        let mut parameters = DataMap::new();
        parameters.insert("message".into(), Value::String(message.into()));
        Self {
            intent: "unknown".into(),
            parameters,
        }
    }
}

/// Result of intent extraction; `tasks` is always non-empty
#[derive(Debug, Clone)]
pub struct Extraction {
    pub tasks: Vec<RawTask>,
    pub summary: String,
}

const FALLBACK_MESSAGE: &str =
    "I couldn't work out what you'd like me to do. Try something like \
     \"create a course called Biology 101\" or type \"help\".";

/// Extract ordered tasks from a natural-language command
///
/// The platform context carries the user's visible entities and recent
/// command history for reference resolution ("publish it").
pub async fn extract_tasks(
    model: &dyn LanguageModel,
    raw_text: &str,
    context: &PlatformContext,
) -> Result<Extraction> {
    let user_prompt = format!(
        "PLATFORM CONTEXT:\n{}\nUSER COMMAND:\n{}\n\nExtract the tasks as JSON:",
        context.summary(),
        raw_text
    );

    let response = model.generate(EXTRACT_SYSTEM_PROMPT, &user_prompt).await?;
    Ok(repair_response(&response))
}

/// Walk the repair ladder over the model's raw text
///
/// Ladder: a `tasks` array is used as-is; a bare `{intent, parameters}`
/// object becomes a single-task list; anything else becomes one `unknown`
/// task. Never fails.
pub fn repair_response(response: &str) -> Extraction {
    let Some(json_str) = locate_json(response) else {
        tracing::warn!("no JSON object in model response, degrading to unknown task");
        return Extraction {
            tasks: vec![RawTask::unknown(FALLBACK_MESSAGE)],
            summary: FALLBACK_MESSAGE.into(),
        };
    };

    let Ok(value) = serde_json::from_str::<Value>(json_str) else {
        tracing::warn!("model response is not valid JSON, degrading to unknown task");
        return Extraction {
            tasks: vec![RawTask::unknown(FALLBACK_MESSAGE)],
            summary: FALLBACK_MESSAGE.into(),
        };
    };

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let tasks = if let Some(array) = value.get("tasks").and_then(Value::as_array) {
        array.iter().filter_map(task_from_value).collect()
    } else if value.get("intent").is_some() {
        task_from_value(&value).into_iter().collect()
    } else {
        Vec::new()
    };

    if tasks.is_empty() {
        return Extraction {
            tasks: vec![RawTask::unknown(FALLBACK_MESSAGE)],
            summary: if summary.is_empty() {
                FALLBACK_MESSAGE.into()
            } else {
                summary
            },
        };
    }

    Extraction { tasks, summary }
}

fn task_from_value(value: &Value) -> Option<RawTask> {
    let intent = value.get("intent")?.as_str()?.to_string();
    let parameters = value
        .get("parameters")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    Some(RawTask { intent, parameters })
}

/// Extract the first top-level JSON object from the response
/// (handles surrounding prose and code fences)
fn locate_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

/// System prompt for task extraction
const EXTRACT_SYSTEM_PROMPT: &str = r#"You are the command parser for an instructor-facing course platform.
Convert the user's instruction into an ordered list of tasks as JSON.

VALID INTENTS:
create_course, create_quiz, create_assignment, create_lecture,
publish_quiz, delete_quiz, delete_course, delete_assignment, delete_lecture,
generate_public_link, list_quizzes, list_courses, list_assignments,
list_lectures, list_enrollments, list_submissions, view_analytics,
navigate, help, unknown

RULES:
- Split instructions joined by "and", "then", "also", "plus" into separate tasks, in the order given.
- Put course creation before any quiz/assignment/lecture task that may depend on it.
- When several tasks concern a course mentioned once, repeat that courseName in each task's parameters.
- Use the PLATFORM CONTEXT and recent commands to resolve references like "it" or "that quiz".
- For "all my quizzes" style publish requests, set "all": true instead of naming one quiz.
- If no valid intent applies, emit a single task with intent "unknown".

PARAMETER FIELDS (use only those that apply):
title, courseName, topic, numQuestions, description, dueDate, page, all, generateQuestions

OUTPUT FORMAT (JSON only, no explanation):
{
  "tasks": [
    {"intent": "...", "parameters": {...}}
  ],
  "summary": "one short sentence describing what will be done"
}

Examples:
"create a course called Biology 101" ->
{"tasks": [{"intent": "create_course", "parameters": {"title": "Biology 101"}}], "summary": "Create the course Biology 101."}

"Create a course called Biology 101 and add a quiz on Cell Division" ->
{"tasks": [{"intent": "create_course", "parameters": {"title": "Biology 101"}}, {"intent": "create_quiz", "parameters": {"topic": "Cell Division", "courseName": "Biology 101"}}], "summary": "Create Biology 101 and a Cell Division quiz in it."}

"publish all my draft quizzes" ->
{"tasks": [{"intent": "publish_quiz", "parameters": {"all": true}}], "summary": "Publish every draft quiz."}

"delete the chemistry midterm then show my courses" ->
{"tasks": [{"intent": "delete_quiz", "parameters": {"title": "chemistry midterm"}}, {"intent": "list_courses", "parameters": {}}], "summary": "Delete the chemistry midterm and list courses."}

"take me to the gradebook" ->
{"tasks": [{"intent": "navigate", "parameters": {"page": "gradebook"}}], "summary": "Open the gradebook."}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_json_simple() {
        let response = r#"{"tasks": []}"#;
        assert_eq!(locate_json(response), Some(response));
    }

    #[test]
    fn test_locate_json_with_surrounding_text() {
        let response = "Here you go:\n```json\n{\"tasks\": []}\n```\nDone.";
        let json = locate_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_tasks_array_used_in_order() {
        let response = r#"{"tasks": [
            {"intent": "create_course", "parameters": {"title": "Biology 101"}},
            {"intent": "create_quiz", "parameters": {"topic": "Cell Division"}}
        ], "summary": "two tasks"}"#;
        let extraction = repair_response(response);
        assert_eq!(extraction.tasks.len(), 2);
        assert_eq!(extraction.tasks[0].intent, "create_course");
        assert_eq!(extraction.tasks[1].intent, "create_quiz");
        assert_eq!(extraction.summary, "two tasks");
    }

    #[test]
    fn test_bare_object_wrapped_as_single_task() {
        let response = r#"{"intent": "list_courses", "parameters": {}}"#;
        let extraction = repair_response(response);
        assert_eq!(extraction.tasks.len(), 1);
        assert_eq!(extraction.tasks[0].intent, "list_courses");
    }

    #[test]
    fn test_prose_degrades_to_unknown() {
        let extraction = repair_response("I'm not sure what you mean by that.");
        assert_eq!(extraction.tasks.len(), 1);
        assert_eq!(extraction.tasks[0].intent, "unknown");
        assert!(extraction.tasks[0].parameters.contains_key("message"));
    }

    #[test]
    fn test_invalid_json_degrades_to_unknown() {
        let extraction = repair_response(r#"{"tasks": [{"intent": }"#);
        assert_eq!(extraction.tasks.len(), 1);
        assert_eq!(extraction.tasks[0].intent, "unknown");
    }

    #[test]
    fn test_empty_tasks_array_degrades_to_unknown() {
        let extraction = repair_response(r#"{"tasks": [], "summary": "nothing"}"#);
        assert_eq!(extraction.tasks.len(), 1);
        assert_eq!(extraction.tasks[0].intent, "unknown");
        // keeps the model's summary when present
        assert_eq!(extraction.summary, "nothing");
    }

    #[test]
    fn test_task_missing_parameters_gets_empty_map() {
        let response = r#"{"tasks": [{"intent": "help"}]}"#;
        let extraction = repair_response(response);
        assert_eq!(extraction.tasks[0].intent, "help");
        assert!(extraction.tasks[0].parameters.is_empty());
    }
}
