//! Task dispatch - one handler per intent
//!
//! Handlers are isolated: any store or model failure is caught here and
//! becomes a `TaskResult{success:false}` with a human-readable message, so
//! one bad task never aborts its siblings and raw store errors never reach
//! the caller.

use crate::command::intent::{
    CreateAssignmentParams, CreateCourseParams, CreateLectureParams, CreateQuizParams, Intent,
    NavigateParams, PublishQuizParams, TargetParams, Task, TaskParams, UnknownParams,
};
use crate::command::resolver::EntityResolver;
use crate::core::error::CopilotError;
use crate::core::types::{Actor, EntityKind};
use crate::llm::{questions, LanguageModel};
use crate::model::command::{DataMap, TaskResult};
use crate::model::{Course, PublishStatus};
use crate::store::{DomainStore, NewAssignment, NewCourse, NewLecture, NewQuestion, NewQuiz};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::Rng;
use serde_json::Value;

/// Records shown inline in a list result; the message carries the true count
const PREVIEW_LIMIT: usize = 10;

/// Default question count when generation is requested without a number
const DEFAULT_QUESTION_COUNT: u32 = 5;
const MAX_QUESTION_COUNT: u32 = 20;

/// Fixed page-name to route table for the `navigate` intent
const ROUTES: &[(&str, &str)] = &[
    ("dashboard", "/dashboard"),
    ("home", "/dashboard"),
    ("course", "/courses"),
    ("quiz", "/quizzes"),
    ("assignment", "/assignments"),
    ("lecture", "/lectures"),
    ("gradebook", "/gradebook"),
    ("grade", "/gradebook"),
    ("analytic", "/analytics"),
    ("student", "/students"),
    ("settings", "/settings"),
];

const LANDING_ROUTE: &str = "/dashboard";

const HELP_TEXT: &str = "I can manage your courses for you. Try:\n\
- \"Create a course called Biology 101\"\n\
- \"Add a quiz on Cell Division with 5 questions\"\n\
- \"Create an assignment on photosynthesis due next week\"\n\
- \"Publish all my draft quizzes\"\n\
- \"List my courses\" (or quizzes, assignments, lectures, enrollments, submissions)\n\
- \"Delete the chemistry midterm\"\n\
- \"Get a public link for my latest quiz\"\n\
- \"Show my analytics\" or \"take me to the gradebook\"";

const UNKNOWN_TEXT: &str =
    "I'm not sure how to help with that. Type \"help\" to see what I can do.";

/// Executes validated tasks against the store and resolver
pub struct TaskDispatcher<'a> {
    store: &'a dyn DomainStore,
    model: &'a dyn LanguageModel,
    actor: &'a Actor,
}

impl<'a> TaskDispatcher<'a> {
    pub fn new(store: &'a dyn DomainStore, model: &'a dyn LanguageModel, actor: &'a Actor) -> Self {
        Self {
            store,
            model,
            actor,
        }
    }

    fn resolver(&self) -> EntityResolver<'a> {
        EntityResolver::new(self.store, self.actor)
    }

    /// Run one task to completion; never returns an error
    pub async fn execute(&self, task: &Task) -> TaskResult {
        tracing::debug!(intent = task.intent.as_str(), "dispatching task");
        match (task.intent, &task.params) {
            (Intent::CreateCourse, TaskParams::CreateCourse(p)) => self.create_course(p).await,
            (Intent::CreateQuiz, TaskParams::CreateQuiz(p)) => self.create_quiz(p).await,
            (Intent::CreateAssignment, TaskParams::CreateAssignment(p)) => {
                self.create_assignment(p).await
            }
            (Intent::CreateLecture, TaskParams::CreateLecture(p)) => self.create_lecture(p).await,
            (Intent::PublishQuiz, TaskParams::PublishQuiz(p)) => self.publish_quiz(p).await,
            (Intent::DeleteQuiz, TaskParams::Target(p)) => self.delete_quiz(p).await,
            (Intent::DeleteCourse, TaskParams::Target(p)) => self.delete_course(p).await,
            (Intent::DeleteAssignment, TaskParams::Target(p)) => self.delete_assignment(p).await,
            (Intent::DeleteLecture, TaskParams::Target(p)) => self.delete_lecture(p).await,
            (Intent::GeneratePublicLink, TaskParams::Target(p)) => self.public_link(p).await,
            (Intent::ListCourses, _) => self.list_courses().await,
            (Intent::ListQuizzes, _) => self.list_quizzes().await,
            (Intent::ListAssignments, _) => self.list_assignments().await,
            (Intent::ListLectures, _) => self.list_lectures().await,
            (Intent::ListEnrollments, _) => self.list_enrollments().await,
            (Intent::ListSubmissions, _) => self.list_submissions().await,
            (Intent::ViewAnalytics, _) => self.view_analytics().await,
            (Intent::Navigate, TaskParams::Navigate(p)) => navigate(p),
            (Intent::Help, _) => TaskResult::ok(HELP_TEXT),
            (Intent::Unknown, TaskParams::Unknown(p)) => unknown(p),
            (intent, _) => {
                tracing::error!(intent = intent.as_str(), "intent/parameter shape mismatch");
                TaskResult::fail(UNKNOWN_TEXT)
            }
        }
    }

    async fn create_course(&self, p: &CreateCourseParams) -> TaskResult {
        let title = p
            .title
            .clone()
            .unwrap_or_else(|| "Untitled Course".to_string());
        let code = p.code.clone().unwrap_or_else(|| course_code(&title));
        match self
            .store
            .create_course(NewCourse {
                owner_id: self.actor.id,
                title: title.clone(),
                code: code.clone(),
                description: p.description.clone().unwrap_or_default(),
            })
            .await
        {
            Ok(course) => {
                let mut data = DataMap::new();
                data.insert("course".into(), to_json(&course));
                TaskResult::ok_with(format!("Created course \"{}\" ({})", title, code), data)
            }
            Err(e) => store_failure("creating the course", e),
        }
    }

    /// Find the course a dependent creation task belongs to
    async fn parent_course(&self, hint: Option<&str>, noun: &str) -> Result<Course, TaskResult> {
        match self.resolver().resolve_course(hint).await {
            Ok(Some(course)) => Ok(course),
            Ok(None) => Err(TaskResult::fail(format!(
                "You don't have a course to add the {} to yet. Create a course first.",
                noun
            ))),
            Err(e) => Err(store_failure("looking up the course", e)),
        }
    }

    async fn create_quiz(&self, p: &CreateQuizParams) -> TaskResult {
        let course = match self.parent_course(p.course_name.as_deref(), "quiz").await {
            Ok(course) => course,
            Err(result) => return result,
        };

        let title = p
            .title
            .clone()
            .or_else(|| p.topic.as_ref().map(|t| format!("{} Quiz", t)))
            .unwrap_or_else(|| "Untitled Quiz".to_string());

        let quiz = match self
            .store
            .create_quiz(NewQuiz {
                course_id: course.id,
                title: title.clone(),
                topic: p.topic.clone(),
                status: PublishStatus::Draft,
            })
            .await
        {
            Ok(quiz) => quiz,
            Err(e) => return store_failure("creating the quiz", e),
        };

        let mut data = DataMap::new();
        data.insert("quiz".into(), to_json(&quiz));

        // Optional second model call; its failure never fails the quiz
        let wants_generation = p.topic.is_some() || p.generate_questions;
        let mut generated = 0usize;
        if wants_generation {
            let topic = p.topic.clone().unwrap_or_else(|| title.clone());
            let count = p
                .num_questions
                .unwrap_or(DEFAULT_QUESTION_COUNT)
                .clamp(1, MAX_QUESTION_COUNT);
            match questions::generate_questions(self.model, &topic, count).await {
                Ok(drafted) => {
                    for question in drafted {
                        match self
                            .store
                            .add_quiz_question(NewQuestion {
                                quiz_id: quiz.id,
                                prompt: question.prompt,
                                options: question.options,
                                answer: question.answer,
                            })
                            .await
                        {
                            Ok(_) => generated += 1,
                            Err(e) => {
                                tracing::warn!(error = %e, "failed to persist generated question")
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, topic, "question generation failed, quiz kept");
                }
            }
        }

        let message = if generated > 0 {
            format!(
                "Created quiz \"{}\" in \"{}\" with {} generated question{}",
                title,
                course.title,
                generated,
                plural(generated)
            )
        } else {
            format!("Created quiz \"{}\" in \"{}\"", title, course.title)
        };
        TaskResult::ok_with(message, data)
    }

    async fn create_assignment(&self, p: &CreateAssignmentParams) -> TaskResult {
        let course = match self
            .parent_course(p.course_name.as_deref(), "assignment")
            .await
        {
            Ok(course) => course,
            Err(result) => return result,
        };

        let title = p
            .title
            .clone()
            .unwrap_or_else(|| "Untitled Assignment".to_string());
        let due_at = parse_due_date(p.due_date.as_deref());

        match self
            .store
            .create_assignment(NewAssignment {
                course_id: course.id,
                title: title.clone(),
                description: p.description.clone().unwrap_or_default(),
                due_at,
                status: PublishStatus::Draft,
            })
            .await
        {
            Ok(assignment) => {
                let mut data = DataMap::new();
                data.insert("assignment".into(), to_json(&assignment));
                TaskResult::ok_with(
                    format!(
                        "Created assignment \"{}\" in \"{}\", due {}",
                        title,
                        course.title,
                        due_at.format("%Y-%m-%d")
                    ),
                    data,
                )
            }
            Err(e) => store_failure("creating the assignment", e),
        }
    }

    async fn create_lecture(&self, p: &CreateLectureParams) -> TaskResult {
        let course = match self.parent_course(p.course_name.as_deref(), "lecture").await {
            Ok(course) => course,
            Err(result) => return result,
        };

        let title = p
            .title
            .clone()
            .or_else(|| p.topic.clone())
            .unwrap_or_else(|| "Untitled Lecture".to_string());

        match self
            .store
            .create_lecture(NewLecture {
                course_id: course.id,
                title: title.clone(),
                scheduled_at: None,
            })
            .await
        {
            Ok(lecture) => {
                let mut data = DataMap::new();
                data.insert("lecture".into(), to_json(&lecture));
                TaskResult::ok_with(
                    format!("Created lecture \"{}\" in \"{}\"", title, course.title),
                    data,
                )
            }
            Err(e) => store_failure("creating the lecture", e),
        }
    }

    async fn publish_quiz(&self, p: &PublishQuizParams) -> TaskResult {
        if p.all {
            return self.publish_all_drafts().await;
        }

        let quiz = match self.resolver().resolve_quiz(p.title.as_deref()).await {
            Ok(Some(quiz)) => quiz,
            Ok(None) => return TaskResult::fail(missing(p.title.as_deref(), EntityKind::Quiz)),
            Err(e) => return store_failure("looking up the quiz", e),
        };

        let title = quiz.title.clone();
        let mut updated = quiz;
        updated.status = PublishStatus::Published;
        match self.store.update_quiz(updated).await {
            Ok(quiz) => {
                let mut data = DataMap::new();
                data.insert("quiz".into(), to_json(&quiz));
                TaskResult::ok_with(format!("Published quiz \"{}\"", title), data)
            }
            Err(e) => store_failure("publishing the quiz", e),
        }
    }

    async fn publish_all_drafts(&self) -> TaskResult {
        let drafts = match self.store.get_quizzes(self.actor).await {
            Ok(quizzes) => quizzes
                .into_iter()
                .filter(|q| q.status == PublishStatus::Draft)
                .collect::<Vec<_>>(),
            Err(e) => return store_failure("listing quizzes", e),
        };
        if drafts.is_empty() {
            return TaskResult::fail("You have no draft quizzes to publish.");
        }

        let mut published = Vec::new();
        for mut quiz in drafts {
            quiz.status = PublishStatus::Published;
            match self.store.update_quiz(quiz).await {
                Ok(quiz) => published.push(to_json(&quiz)),
                Err(e) => tracing::warn!(error = %e, "failed to publish one draft quiz"),
            }
        }
        if published.is_empty() {
            return TaskResult::fail("Couldn't publish your draft quizzes. Please try again.");
        }

        let count = published.len();
        let mut data = DataMap::new();
        data.insert("quizzes".into(), Value::Array(published));
        TaskResult::ok_with(format!("Published {} quiz{}", count, quiz_plural(count)), data)
    }

    async fn delete_quiz(&self, p: &TargetParams) -> TaskResult {
        let quiz = match self.resolver().resolve_quiz(p.hint()).await {
            Ok(Some(quiz)) => quiz,
            Ok(None) => return TaskResult::fail(missing(p.hint(), EntityKind::Quiz)),
            Err(e) => return store_failure("looking up the quiz", e),
        };
        match self.store.delete_quiz(quiz.id).await {
            Ok(()) => TaskResult::ok(format!("Deleted quiz \"{}\"", quiz.title)),
            Err(e) => store_failure("deleting the quiz", e),
        }
    }

    async fn delete_course(&self, p: &TargetParams) -> TaskResult {
        let course = match self.resolver().resolve_course(p.hint()).await {
            Ok(Some(course)) => course,
            Ok(None) => return TaskResult::fail(missing(p.hint(), EntityKind::Course)),
            Err(e) => return store_failure("looking up the course", e),
        };
        match self.store.delete_course(course.id).await {
            Ok(()) => TaskResult::ok(format!(
                "Deleted course \"{}\" and everything in it",
                course.title
            )),
            Err(e) => store_failure("deleting the course", e),
        }
    }

    async fn delete_assignment(&self, p: &TargetParams) -> TaskResult {
        let assignment = match self.resolver().resolve_assignment(p.hint()).await {
            Ok(Some(assignment)) => assignment,
            Ok(None) => return TaskResult::fail(missing(p.hint(), EntityKind::Assignment)),
            Err(e) => return store_failure("looking up the assignment", e),
        };
        match self.store.delete_assignment(assignment.id).await {
            Ok(()) => TaskResult::ok(format!("Deleted assignment \"{}\"", assignment.title)),
            Err(e) => store_failure("deleting the assignment", e),
        }
    }

    async fn delete_lecture(&self, p: &TargetParams) -> TaskResult {
        let lecture = match self.resolver().resolve_lecture(p.hint()).await {
            Ok(Some(lecture)) => lecture,
            Ok(None) => return TaskResult::fail(missing(p.hint(), EntityKind::Lecture)),
            Err(e) => return store_failure("looking up the lecture", e),
        };
        match self.store.delete_lecture(lecture.id).await {
            Ok(()) => TaskResult::ok(format!("Deleted lecture \"{}\"", lecture.title)),
            Err(e) => store_failure("deleting the lecture", e),
        }
    }

    async fn public_link(&self, p: &TargetParams) -> TaskResult {
        let quiz = match self.resolver().resolve_quiz(p.hint()).await {
            Ok(Some(quiz)) => quiz,
            Ok(None) => return TaskResult::fail(missing(p.hint(), EntityKind::Quiz)),
            Err(e) => return store_failure("looking up the quiz", e),
        };
        match self.store.generate_quiz_public_link(quiz.id).await {
            Ok(quiz) => {
                let link = quiz.public_link.clone().unwrap_or_default();
                let mut data = DataMap::new();
                data.insert("publicLink".into(), Value::String(link.clone()));
                data.insert("quiz".into(), to_json(&quiz));
                TaskResult::ok_with(
                    format!("Public link for \"{}\": {}", quiz.title, link),
                    data,
                )
            }
            Err(e) => store_failure("generating the public link", e),
        }
    }

    async fn list_courses(&self) -> TaskResult {
        match self.store.get_courses(self.actor).await {
            Ok(items) => listed("course", "courses", items),
            Err(e) => store_failure("listing courses", e),
        }
    }

    async fn list_quizzes(&self) -> TaskResult {
        match self.store.get_quizzes(self.actor).await {
            Ok(items) => listed("quiz", "quizzes", items),
            Err(e) => store_failure("listing quizzes", e),
        }
    }

    async fn list_assignments(&self) -> TaskResult {
        match self.store.get_assignments(self.actor).await {
            Ok(items) => listed("assignment", "assignments", items),
            Err(e) => store_failure("listing assignments", e),
        }
    }

    async fn list_lectures(&self) -> TaskResult {
        match self.store.get_lectures(self.actor).await {
            Ok(items) => listed("lecture", "lectures", items),
            Err(e) => store_failure("listing lectures", e),
        }
    }

    async fn list_enrollments(&self) -> TaskResult {
        match self.store.get_enrollments(self.actor).await {
            Ok(items) => listed("enrollment", "enrollments", items),
            Err(e) => store_failure("listing enrollments", e),
        }
    }

    async fn list_submissions(&self) -> TaskResult {
        match self.store.get_quiz_submissions(self.actor).await {
            Ok(items) => listed("submission", "submissions", items),
            Err(e) => store_failure("listing submissions", e),
        }
    }

    async fn view_analytics(&self) -> TaskResult {
        match self.store.get_dashboard_stats(self.actor).await {
            Ok(stats) => {
                let message = format!(
                    "You have {} course{}, {} quiz{}, {} assignment{}, and {} lecture{}; \
                     {} enrollment{} and {} submission{} overall.",
                    stats.courses,
                    plural(stats.courses),
                    stats.quizzes,
                    quiz_plural(stats.quizzes),
                    stats.assignments,
                    plural(stats.assignments),
                    stats.lectures,
                    plural(stats.lectures),
                    stats.enrollments,
                    plural(stats.enrollments),
                    stats.submissions,
                    plural(stats.submissions),
                );
                let mut data = DataMap::new();
                data.insert("stats".into(), to_json(&stats));
                TaskResult::ok_with(message, data)
            }
            Err(e) => store_failure("loading analytics", e),
        }
    }
}

/// Bounded-preview list result; the message always carries the true count.
/// `plural` doubles as the data key.
fn listed<T: serde::Serialize>(singular: &str, plural: &str, items: Vec<T>) -> TaskResult {
    let total = items.len();
    let preview: Vec<Value> = items.iter().take(PREVIEW_LIMIT).map(to_json).collect();
    let mut data = DataMap::new();
    data.insert(plural.into(), Value::Array(preview));
    let label = if total == 1 { singular } else { plural };
    TaskResult::ok_with(format!("Found {} {}", total, label), data)
}

fn navigate(p: &NavigateParams) -> TaskResult {
    let page = p
        .page
        .as_deref()
        .unwrap_or("dashboard")
        .trim()
        .to_lowercase();
    let route = ROUTES
        .iter()
        .find(|(key, _)| page.contains(key))
        .map(|(_, route)| *route)
        .unwrap_or(LANDING_ROUTE);
    let mut data = DataMap::new();
    data.insert("route".into(), Value::String(route.into()));
    TaskResult::ok_with(format!("Navigating to {}", route), data)
}

fn unknown(p: &UnknownParams) -> TaskResult {
    TaskResult::ok(p.message.clone().unwrap_or_else(|| UNKNOWN_TEXT.to_string()))
}

/// Course code from the title's initials plus a random suffix, e.g.
/// "Introduction to Biology" -> "ITB-482"
fn course_code(title: &str) -> String {
    let initials: String = title
        .split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphabetic()))
        .take(4)
        .collect::<String>()
        .to_uppercase();
    let prefix = if initials.is_empty() {
        "CRS".to_string()
    } else {
        initials
    };
    format!("{}-{}", prefix, rand::thread_rng().gen_range(100..1000))
}

/// Accepts RFC 3339 or plain dates; anything else falls back to one week out
fn parse_due_date(raw: Option<&str>) -> DateTime<Utc> {
    if let Some(raw) = raw {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return parsed.with_timezone(&Utc);
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            if let Some(dt) = date.and_hms_opt(23, 59, 0) {
                return Utc.from_utc_datetime(&dt);
            }
        }
    }
    Utc::now() + Duration::days(7)
}

fn missing(hint: Option<&str>, kind: EntityKind) -> String {
    match hint {
        Some(hint) => format!("No {} matching \"{}\" found.", kind.label(), hint),
        None => format!("You don't have any {} yet.", kind.plural_label()),
    }
}

fn store_failure(context: &str, err: CopilotError) -> TaskResult {
    tracing::warn!(error = %err, context, "store operation failed");
    TaskResult::fail(format!("Something went wrong while {}.", context))
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn quiz_plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "zes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Role, UserId};
    use crate::llm::extractor::RawTask;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;

    /// Model stub for handlers that may call question generation
    struct NoModel;

    #[async_trait]
    impl LanguageModel for NoModel {
        async fn generate(&self, _system: &str, _user: &str) -> crate::core::error::Result<String> {
            Err(CopilotError::ModelError("unavailable".into()))
        }
    }

    /// Model stub returning a fixed question payload
    struct QuestionModel;

    #[async_trait]
    impl LanguageModel for QuestionModel {
        async fn generate(&self, _system: &str, _user: &str) -> crate::core::error::Result<String> {
            Ok(r#"{"questions": [
                {"prompt": "Q1", "options": ["A", "B", "C", "D"], "answer": 1},
                {"prompt": "Q2", "options": ["A", "B", "C", "D"], "answer": 0}
            ]}"#
            .to_string())
        }
    }

    fn task(intent: &str, params: serde_json::Value) -> Task {
        Task::from_raw(&RawTask {
            intent: intent.into(),
            parameters: params.as_object().cloned().unwrap_or_default(),
        })
        .unwrap()
    }

    fn actor() -> Actor {
        Actor::new(UserId::new(), Role::Instructor)
    }

    #[tokio::test]
    async fn test_create_course_applies_defaults() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);

        let result = dispatcher
            .execute(&task("create_course", json!({"title": "Intro to Biology"})))
            .await;
        assert!(result.success);
        let course = &result.data.as_ref().unwrap()["course"];
        let code = course["code"].as_str().unwrap();
        assert!(code.starts_with("ITB-"), "unexpected code {}", code);
    }

    #[tokio::test]
    async fn test_create_quiz_without_course_fails_cleanly() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);

        let result = dispatcher
            .execute(&task("create_quiz", json!({"topic": "Cells"})))
            .await;
        assert!(!result.success);
        assert!(result.message.contains("Create a course first"));
    }

    #[tokio::test]
    async fn test_create_quiz_with_generated_questions() {
        let store = MemoryStore::new();
        let actor = actor();
        {
            let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);
            dispatcher
                .execute(&task("create_course", json!({"title": "Biology 101"})))
                .await;
        }
        let dispatcher = TaskDispatcher::new(&store, &QuestionModel, &actor);
        let result = dispatcher
            .execute(&task(
                "create_quiz",
                json!({"topic": "Cell Division", "numQuestions": 2}),
            ))
            .await;
        assert!(result.success);
        assert!(result.message.contains("2 generated questions"));

        let quiz_id = result.data.as_ref().unwrap()["quiz"]["id"].clone();
        let quiz_id: crate::core::types::QuizId = serde_json::from_value(quiz_id).unwrap();
        assert_eq!(store.get_quiz_questions(quiz_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_quiz() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);
        dispatcher
            .execute(&task("create_course", json!({"title": "Biology 101"})))
            .await;

        let result = dispatcher
            .execute(&task("create_quiz", json!({"topic": "Cell Division"})))
            .await;
        assert!(result.success);
        assert!(!result.message.contains("generated question"));
        assert_eq!(store.get_quizzes(&actor).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_quiz_titled_after_topic() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);
        dispatcher
            .execute(&task("create_course", json!({"title": "Biology 101"})))
            .await;

        let result = dispatcher
            .execute(&task("create_quiz", json!({"topic": "Cell Division"})))
            .await;
        let quiz = &result.data.as_ref().unwrap()["quiz"];
        assert_eq!(quiz["title"], "Cell Division Quiz");
    }

    #[tokio::test]
    async fn test_assignment_default_due_date_one_week_out() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);
        dispatcher
            .execute(&task("create_course", json!({"title": "Biology 101"})))
            .await;

        let result = dispatcher
            .execute(&task("create_assignment", json!({"title": "Lab Report"})))
            .await;
        assert!(result.success);
        let due: DateTime<Utc> = serde_json::from_value(
            result.data.as_ref().unwrap()["assignment"]["due_at"].clone(),
        )
        .unwrap();
        let days = (due - Utc::now()).num_days();
        assert!((6..=7).contains(&days), "due in {} days", days);
    }

    #[tokio::test]
    async fn test_publish_all_drafts_scoped_to_actor() {
        let store = MemoryStore::new();
        let alice = actor();
        let bob = actor();
        for who in [&alice, &bob] {
            let dispatcher = TaskDispatcher::new(&store, &NoModel, who);
            dispatcher
                .execute(&task("create_course", json!({"title": "Course"})))
                .await;
        }
        let alice_dispatcher = TaskDispatcher::new(&store, &NoModel, &alice);
        for i in 0..3 {
            alice_dispatcher
                .execute(&task("create_quiz", json!({"title": format!("Quiz {}", i)})))
                .await;
        }
        let bob_dispatcher = TaskDispatcher::new(&store, &NoModel, &bob);
        bob_dispatcher
            .execute(&task("create_quiz", json!({"title": "Bob's Quiz"})))
            .await;

        let result = alice_dispatcher
            .execute(&task("publish_quiz", json!({"all": true})))
            .await;
        assert!(result.success);
        assert!(result.message.contains("Published 3 quizzes"));

        let alice_quizzes = store.get_quizzes(&alice).await.unwrap();
        assert!(alice_quizzes
            .iter()
            .all(|q| q.status == PublishStatus::Published));
        let bob_quizzes = store.get_quizzes(&bob).await.unwrap();
        assert!(bob_quizzes.iter().all(|q| q.status == PublishStatus::Draft));
    }

    #[tokio::test]
    async fn test_publish_with_no_quizzes_is_task_failure() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);

        let result = dispatcher
            .execute(&task("publish_quiz", json!({"title": "Midterm"})))
            .await;
        assert!(!result.success);
        assert!(result.message.contains("Midterm"));
    }

    #[tokio::test]
    async fn test_resolution_miss_names_the_entity_kind() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);

        let result = dispatcher.execute(&task("delete_quiz", json!({}))).await;
        assert!(!result.success);
        assert_eq!(result.message, "You don't have any quizzes yet.");

        let result = dispatcher
            .execute(&task("delete_lecture", json!({"title": "Intro"})))
            .await;
        assert!(!result.success);
        assert_eq!(result.message, "No lecture matching \"Intro\" found.");
    }

    #[tokio::test]
    async fn test_list_courses_empty() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);

        let result = dispatcher.execute(&task("list_courses", json!({}))).await;
        assert!(result.success);
        assert_eq!(result.message, "Found 0 courses");
        assert_eq!(
            result.data.as_ref().unwrap()["courses"],
            Value::Array(vec![])
        );
    }

    #[tokio::test]
    async fn test_list_preview_is_bounded() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);
        for i in 0..12 {
            dispatcher
                .execute(&task("create_course", json!({"title": format!("C{}", i)})))
                .await;
        }

        let result = dispatcher.execute(&task("list_courses", json!({}))).await;
        assert_eq!(result.message, "Found 12 courses");
        assert_eq!(
            result.data.as_ref().unwrap()["courses"]
                .as_array()
                .unwrap()
                .len(),
            PREVIEW_LIMIT
        );
    }

    #[tokio::test]
    async fn test_list_enrollments_and_submissions() {
        use crate::model::{Enrollment, Submission};

        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);
        let course = dispatcher
            .execute(&task("create_course", json!({"title": "Biology 101"})))
            .await;
        let course_id = serde_json::from_value(
            course.data.as_ref().unwrap()["course"]["id"].clone(),
        )
        .unwrap();
        let quiz = dispatcher
            .execute(&task("create_quiz", json!({"title": "Midterm"})))
            .await;
        let quiz_id =
            serde_json::from_value(quiz.data.as_ref().unwrap()["quiz"]["id"].clone()).unwrap();

        store.add_enrollment(Enrollment {
            id: crate::core::types::EnrollmentId::new(),
            course_id,
            student_id: UserId::new(),
            student_name: "Sam Student".into(),
            enrolled_at: Utc::now(),
        });
        store.add_submission(Submission {
            id: crate::core::types::SubmissionId::new(),
            quiz_id,
            student_id: UserId::new(),
            score: 0.8,
            submitted_at: Utc::now(),
        });

        let result = dispatcher.execute(&task("list_enrollments", json!({}))).await;
        assert_eq!(result.message, "Found 1 enrollment");
        let result = dispatcher.execute(&task("list_submissions", json!({}))).await;
        assert_eq!(result.message, "Found 1 submission");
    }

    #[tokio::test]
    async fn test_view_analytics_counts() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);
        dispatcher
            .execute(&task("create_course", json!({"title": "Biology 101"})))
            .await;
        dispatcher
            .execute(&task("create_quiz", json!({"title": "Midterm"})))
            .await;

        let result = dispatcher.execute(&task("view_analytics", json!({}))).await;
        assert!(result.success);
        let stats = &result.data.as_ref().unwrap()["stats"];
        assert_eq!(stats["courses"], 1);
        assert_eq!(stats["quizzes"], 1);
    }

    #[tokio::test]
    async fn test_navigate_known_and_unknown_pages() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);

        let result = dispatcher
            .execute(&task("navigate", json!({"page": "the gradebook"})))
            .await;
        assert_eq!(result.data.as_ref().unwrap()["route"], "/gradebook");

        let result = dispatcher
            .execute(&task("navigate", json!({"page": "the moon"})))
            .await;
        assert_eq!(result.data.as_ref().unwrap()["route"], LANDING_ROUTE);
    }

    #[tokio::test]
    async fn test_help_and_unknown_always_succeed() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);

        assert!(dispatcher.execute(&task("help", json!({}))).await.success);
        let result = dispatcher
            .execute(&task("unknown", json!({"message": "custom text"})))
            .await;
        assert!(result.success);
        assert_eq!(result.message, "custom text");
    }

    #[tokio::test]
    async fn test_delete_resolves_fuzzily() {
        let store = MemoryStore::new();
        let actor = actor();
        let dispatcher = TaskDispatcher::new(&store, &NoModel, &actor);
        dispatcher
            .execute(&task("create_course", json!({"title": "Chemistry"})))
            .await;
        dispatcher
            .execute(&task("create_quiz", json!({"title": "Chemistry Midterm"})))
            .await;

        let result = dispatcher
            .execute(&task("delete_quiz", json!({"title": "midterm"})))
            .await;
        assert!(result.success);
        assert!(store.get_quizzes(&actor).await.unwrap().is_empty());
    }

    #[test]
    fn test_parse_due_date_formats() {
        let explicit = parse_due_date(Some("2026-09-15"));
        assert_eq!(explicit.format("%Y-%m-%d").to_string(), "2026-09-15");

        let fallback = parse_due_date(Some("whenever"));
        assert!((fallback - Utc::now()).num_days() >= 6);
    }

    #[test]
    fn test_course_code_shape() {
        let code = course_code("Intro to Biology");
        assert!(code.starts_with("ITB-"));
        let code = course_code("");
        assert!(code.starts_with("CRS-"));
    }
}
