//! Platform context for extraction prompts
//!
//! A compact snapshot of what the acting user already has, so the model
//! can disambiguate references like "my biology course" or "publish it".
//! Lists are capped to keep the prompt bounded.

use crate::core::error::Result;
use crate::core::types::Actor;
use crate::store::DomainStore;

/// Max entries per entity list embedded in the prompt
const MAX_ENTITIES: usize = 10;
/// Max prior commands embedded for pronoun resolution
const MAX_HISTORY: usize = 5;

/// Snapshot of the acting user's platform state
pub struct PlatformContext {
    /// "Title (CODE)" per visible course
    pub courses: Vec<String>,
    /// "Title [course title]" per visible quiz
    pub quizzes: Vec<String>,
    pub assignments: Vec<String>,
    /// Raw text of the most recent prior commands, newest first
    pub recent_commands: Vec<String>,
}

impl PlatformContext {
    /// Build a snapshot of the actor's visible entities and recent history
    pub async fn from_store(store: &dyn DomainStore, actor: &Actor) -> Result<Self> {
        let courses = store.get_courses(actor).await?;
        let quizzes = store.get_quizzes(actor).await?;
        let assignments = store.get_assignments(actor).await?;
        let history = store.get_commands(actor.id).await?;

        let course_title = |id| {
            courses
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.title.clone())
                .unwrap_or_else(|| "unknown course".into())
        };

        Ok(Self {
            quizzes: quizzes
                .iter()
                .take(MAX_ENTITIES)
                .map(|q| format!("{} [{}]", q.title, course_title(q.course_id)))
                .collect(),
            assignments: assignments
                .iter()
                .take(MAX_ENTITIES)
                .map(|a| format!("{} [{}]", a.title, course_title(a.course_id)))
                .collect(),
            courses: courses
                .iter()
                .take(MAX_ENTITIES)
                .map(|c| format!("{} ({})", c.title, c.code))
                .collect(),
            recent_commands: history
                .iter()
                .take(MAX_HISTORY)
                .map(|c| c.raw_text.clone())
                .collect(),
        })
    }

    /// Create an empty context for testing
    pub fn empty() -> Self {
        Self {
            courses: vec![],
            quizzes: vec![],
            assignments: vec![],
            recent_commands: vec![],
        }
    }

    /// Render the snapshot as prompt text
    pub fn summary(&self) -> String {
        let mut s = String::new();

        if self.courses.is_empty() {
            s.push_str("Courses: none yet\n");
        } else {
            s.push_str("Courses:\n");
            for course in &self.courses {
                s.push_str(&format!("- {}\n", course));
            }
        }

        if !self.quizzes.is_empty() {
            s.push_str("Quizzes:\n");
            for quiz in &self.quizzes {
                s.push_str(&format!("- {}\n", quiz));
            }
        }

        if !self.assignments.is_empty() {
            s.push_str("Assignments:\n");
            for assignment in &self.assignments {
                s.push_str(&format!("- {}\n", assignment));
            }
        }

        if !self.recent_commands.is_empty() {
            s.push_str("Recent commands (newest first):\n");
            for command in &self.recent_commands {
                s.push_str(&format!("- {}\n", command));
            }
        }

        s
    }
}
