//! Context threading between tasks of one command
//!
//! "Create a course called Biology 101 and add a quiz on Cell Division"
//! never names a course for the quiz; the chain carries it across. Every
//! entity created during the command is recorded keyed by kind, so a
//! command that creates two courses keeps both on record; the injection
//! target is the most recent one (last-write-wins for the remainder of
//! the command, never cleared by unrelated tasks).

use crate::command::intent::{Task, TaskParams};
use crate::core::types::EntityKind;
use std::collections::HashMap;

/// Entities created so far while executing one command
#[derive(Debug, Default)]
pub struct CommandContext {
    created: HashMap<EntityKind, Vec<String>>,
}

impl CommandContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly created entity's name
    pub fn record(&mut self, kind: EntityKind, name: impl Into<String>) {
        self.created.entry(kind).or_default().push(name.into());
    }

    /// Name of the most recently created course in this command, if any
    pub fn last_course(&self) -> Option<&str> {
        self.created
            .get(&EntityKind::Course)
            .and_then(|names| names.last())
            .map(String::as_str)
    }

    /// All names created for a kind, in creation order
    pub fn created(&self, kind: EntityKind) -> &[String] {
        self.created.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fill in the course reference of a dependent creation task that
    /// omitted it. Explicit references are never overwritten.
    pub fn inject(&self, task: &mut Task) {
        if !task.intent.wants_course_injection() {
            return;
        }
        let Some(course) = self.last_course() else {
            return;
        };

        let slot = match &mut task.params {
            TaskParams::CreateQuiz(p) => &mut p.course_name,
            TaskParams::CreateAssignment(p) => &mut p.course_name,
            TaskParams::CreateLecture(p) => &mut p.course_name,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(course.to_string());
        }
    }
}
