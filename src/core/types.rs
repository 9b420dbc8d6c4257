//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Unique identifier for platform users
    UserId
);
id_type!(
    /// Unique identifier for courses
    CourseId
);
id_type!(
    /// Unique identifier for quizzes
    QuizId
);
id_type!(
    /// Unique identifier for quiz questions
    QuestionId
);
id_type!(
    /// Unique identifier for assignments
    AssignmentId
);
id_type!(
    /// Unique identifier for lectures
    LectureId
);
id_type!(
    /// Unique identifier for enrollments
    EnrollmentId
);
id_type!(
    /// Unique identifier for quiz submissions
    SubmissionId
);
id_type!(
    /// Unique identifier for command audit records
    CommandId
);

/// Role of the acting user
///
/// Admin sees every record; Instructor is scoped to owned courses and
/// their child quizzes/assignments/lectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Instructor,
    Student,
}

/// The authenticated user on whose behalf a command runs
///
/// Supplied by the session layer; this subsystem never authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Elevated actors see the full entity set, not just owned records
    pub fn is_elevated(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Kinds of platform entities the resolver can look up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Course,
    Quiz,
    Assignment,
    Lecture,
}

impl EntityKind {
    /// Human-readable singular label, used in task failure messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Course => "course",
            EntityKind::Quiz => "quiz",
            EntityKind::Assignment => "assignment",
            EntityKind::Lecture => "lecture",
        }
    }

    pub fn plural_label(&self) -> &'static str {
        match self {
            EntityKind::Course => "courses",
            EntityKind::Quiz => "quizzes",
            EntityKind::Assignment => "assignments",
            EntityKind::Lecture => "lectures",
        }
    }
}
