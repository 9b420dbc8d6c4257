//! Closed intent vocabulary and typed task parameters
//!
//! The model emits loosely-typed JSON; this module is the validation
//! boundary. Every intent gets an explicit parameter struct with optional
//! fields, and numeric/boolean fields tolerate string encodings ("5",
//! "true") because models produce both.

use crate::core::error::{CopilotError, Result};
use crate::llm::extractor::RawTask;
use crate::model::command::DataMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Everything a task can ask the platform to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    CreateCourse,
    CreateQuiz,
    CreateAssignment,
    CreateLecture,
    PublishQuiz,
    DeleteQuiz,
    DeleteCourse,
    DeleteAssignment,
    DeleteLecture,
    GeneratePublicLink,
    ListQuizzes,
    ListCourses,
    ListAssignments,
    ListLectures,
    ListEnrollments,
    ListSubmissions,
    ViewAnalytics,
    Navigate,
    Help,
    Unknown,
}

impl Intent {
    /// Parse the wire label; anything unrecognized is `Unknown`
    pub fn parse(s: &str) -> Intent {
        match s.trim() {
            "create_course" => Intent::CreateCourse,
            "create_quiz" => Intent::CreateQuiz,
            "create_assignment" => Intent::CreateAssignment,
            "create_lecture" => Intent::CreateLecture,
            "publish_quiz" => Intent::PublishQuiz,
            "delete_quiz" => Intent::DeleteQuiz,
            "delete_course" => Intent::DeleteCourse,
            "delete_assignment" => Intent::DeleteAssignment,
            "delete_lecture" => Intent::DeleteLecture,
            "generate_public_link" => Intent::GeneratePublicLink,
            "list_quizzes" => Intent::ListQuizzes,
            "list_courses" => Intent::ListCourses,
            "list_assignments" => Intent::ListAssignments,
            "list_lectures" => Intent::ListLectures,
            "list_enrollments" => Intent::ListEnrollments,
            "list_submissions" => Intent::ListSubmissions,
            "view_analytics" => Intent::ViewAnalytics,
            "navigate" => Intent::Navigate,
            "help" => Intent::Help,
            _ => Intent::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CreateCourse => "create_course",
            Intent::CreateQuiz => "create_quiz",
            Intent::CreateAssignment => "create_assignment",
            Intent::CreateLecture => "create_lecture",
            Intent::PublishQuiz => "publish_quiz",
            Intent::DeleteQuiz => "delete_quiz",
            Intent::DeleteCourse => "delete_course",
            Intent::DeleteAssignment => "delete_assignment",
            Intent::DeleteLecture => "delete_lecture",
            Intent::GeneratePublicLink => "generate_public_link",
            Intent::ListQuizzes => "list_quizzes",
            Intent::ListCourses => "list_courses",
            Intent::ListAssignments => "list_assignments",
            Intent::ListLectures => "list_lectures",
            Intent::ListEnrollments => "list_enrollments",
            Intent::ListSubmissions => "list_submissions",
            Intent::ViewAnalytics => "view_analytics",
            Intent::Navigate => "navigate",
            Intent::Help => "help",
            Intent::Unknown => "unknown",
        }
    }

    /// Intents that take an implicitly-injected course from the context chain
    pub fn wants_course_injection(&self) -> bool {
        matches!(
            self,
            Intent::CreateQuiz | Intent::CreateAssignment | Intent::CreateLecture
        )
    }
}

/// A validated task: intent plus its typed parameters
#[derive(Debug, Clone)]
pub struct Task {
    pub intent: Intent,
    pub params: TaskParams,
}

impl Task {
    /// Validate a raw extracted task at the dispatcher boundary
    ///
    /// An unrecognized intent becomes `Unknown`; a parameter map that does
    /// not fit the intent's shape is an error the dispatcher converts into
    /// a task failure.
    pub fn from_raw(raw: &RawTask) -> Result<Task> {
        let intent = Intent::parse(&raw.intent);
        let params = TaskParams::from_map(intent, &raw.parameters)?;
        Ok(Task { intent, params })
    }
}

/// Typed parameters, one variant per intent shape
#[derive(Debug, Clone)]
pub enum TaskParams {
    CreateCourse(CreateCourseParams),
    CreateQuiz(CreateQuizParams),
    CreateAssignment(CreateAssignmentParams),
    CreateLecture(CreateLectureParams),
    PublishQuiz(PublishQuizParams),
    /// Shared shape for delete_* and generate_public_link
    Target(TargetParams),
    /// list_* and view_analytics carry no parameters
    None,
    Navigate(NavigateParams),
    Help,
    Unknown(UnknownParams),
}

impl TaskParams {
    pub fn from_map(intent: Intent, map: &DataMap) -> Result<TaskParams> {
        let value = Value::Object(map.clone());
        let invalid = |e: serde_json::Error| {
            CopilotError::InvalidParameters(format!("{}: {}", intent.as_str(), e))
        };
        Ok(match intent {
            Intent::CreateCourse => TaskParams::CreateCourse(
                serde_json::from_value(value).map_err(invalid)?,
            ),
            Intent::CreateQuiz => {
                TaskParams::CreateQuiz(serde_json::from_value(value).map_err(invalid)?)
            }
            Intent::CreateAssignment => TaskParams::CreateAssignment(
                serde_json::from_value(value).map_err(invalid)?,
            ),
            Intent::CreateLecture => TaskParams::CreateLecture(
                serde_json::from_value(value).map_err(invalid)?,
            ),
            Intent::PublishQuiz => {
                TaskParams::PublishQuiz(serde_json::from_value(value).map_err(invalid)?)
            }
            Intent::DeleteQuiz
            | Intent::DeleteCourse
            | Intent::DeleteAssignment
            | Intent::DeleteLecture
            | Intent::GeneratePublicLink => {
                TaskParams::Target(serde_json::from_value(value).map_err(invalid)?)
            }
            Intent::ListQuizzes
            | Intent::ListCourses
            | Intent::ListAssignments
            | Intent::ListLectures
            | Intent::ListEnrollments
            | Intent::ListSubmissions
            | Intent::ViewAnalytics => TaskParams::None,
            Intent::Navigate => {
                TaskParams::Navigate(serde_json::from_value(value).map_err(invalid)?)
            }
            Intent::Help => TaskParams::Help,
            Intent::Unknown => {
                TaskParams::Unknown(serde_json::from_value(value).map_err(invalid)?)
            }
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseParams {
    pub title: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizParams {
    pub title: Option<String>,
    #[serde(alias = "course")]
    pub course_name: Option<String>,
    pub topic: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub num_questions: Option<u32>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub generate_questions: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentParams {
    pub title: Option<String>,
    #[serde(alias = "course")]
    pub course_name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLectureParams {
    pub title: Option<String>,
    #[serde(alias = "course")]
    pub course_name: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishQuizParams {
    pub title: Option<String>,
    /// Publish every in-scope draft quiz instead of one named target
    #[serde(default, deserialize_with = "lenient_bool")]
    pub all: bool,
}

/// Name hint for a mutation target
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetParams {
    pub title: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "course")]
    pub course_name: Option<String>,
}

impl TargetParams {
    /// Best available name hint, in declaration priority
    pub fn hint(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .or(self.course_name.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavigateParams {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnknownParams {
    /// Non-string values fall back to the canned help text; an unknown
    /// task must never fail validation
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub message: Option<String>,
}

/// Accept strings; anything else becomes `None` instead of an error
fn lenient_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Accept numbers or numeric strings ("5")
fn lenient_opt_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().map(|n| n as u32),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Accept booleans, "true"/"yes", or nonzero numbers
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => {
            matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1")
        }
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(intent: &str, params: Value) -> RawTask {
        RawTask {
            intent: intent.into(),
            parameters: params.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_intent_round_trip() {
        for label in [
            "create_course",
            "publish_quiz",
            "generate_public_link",
            "list_submissions",
            "view_analytics",
            "navigate",
        ] {
            assert_eq!(Intent::parse(label).as_str(), label);
        }
    }

    #[test]
    fn test_unrecognized_intent_is_unknown() {
        assert_eq!(Intent::parse("make_me_coffee"), Intent::Unknown);
        assert_eq!(Intent::parse(""), Intent::Unknown);
    }

    #[test]
    fn test_create_quiz_params_accept_aliases() {
        let task = Task::from_raw(&raw(
            "create_quiz",
            json!({"course": "Biology 101", "topic": "Cells", "numQuestions": "5"}),
        ))
        .unwrap();
        let TaskParams::CreateQuiz(params) = task.params else {
            panic!("wrong variant");
        };
        assert_eq!(params.course_name.as_deref(), Some("Biology 101"));
        assert_eq!(params.num_questions, Some(5));
    }

    #[test]
    fn test_publish_all_accepts_string_bool() {
        let task = Task::from_raw(&raw("publish_quiz", json!({"all": "true"}))).unwrap();
        let TaskParams::PublishQuiz(params) = task.params else {
            panic!("wrong variant");
        };
        assert!(params.all);
    }

    #[test]
    fn test_unknown_message_tolerates_non_string() {
        let task = Task::from_raw(&raw("unknown", json!({"message": 123}))).unwrap();
        let TaskParams::Unknown(params) = task.params else {
            panic!("wrong variant");
        };
        assert!(params.message.is_none());
    }

    #[test]
    fn test_target_hint_priority() {
        let params = TargetParams {
            title: None,
            name: Some("Midterm".into()),
            course_name: Some("Biology".into()),
        };
        assert_eq!(params.hint(), Some("Midterm"));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let task = Task::from_raw(&raw(
            "create_course",
            json!({"title": "Biology 101", "mood": "excited"}),
        ))
        .unwrap();
        let TaskParams::CreateCourse(params) = task.params else {
            panic!("wrong variant");
        };
        assert_eq!(params.title.as_deref(), Some("Biology 101"));
    }

    #[test]
    fn test_injection_set() {
        assert!(Intent::CreateQuiz.wants_course_injection());
        assert!(Intent::CreateLecture.wants_course_injection());
        assert!(!Intent::CreateCourse.wants_course_injection());
        assert!(!Intent::PublishQuiz.wants_course_injection());
    }
}
