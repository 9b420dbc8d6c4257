//! Domain records managed by the platform store
//!
//! These are the rows the command pipeline reads and writes. The pipeline
//! itself never constructs them ad hoc; creation goes through the store so
//! ids and timestamps are assigned in one place.

pub mod command;

pub use command::{AggregatedResult, Command, CommandStatus, TaskOutcome, TaskResult};

use crate::core::types::{
    AssignmentId, CourseId, EnrollmentId, LectureId, QuestionId, QuizId, Role, SubmissionId,
    UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform user (instructor, admin, or student)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Publication state for quizzes and assignments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub owner_id: UserId,
    pub title: String,
    /// Short code like "BIO-4821"; matched by the resolver alongside the title
    pub code: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub course_id: CourseId,
    pub title: String,
    pub topic: Option<String>,
    pub status: PublishStatus,
    /// Slug for anonymous access, set by `generate_public_link`
    pub public_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub quiz_id: QuizId,
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub answer: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub due_at: DateTime<Utc>,
    pub status: PublishStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    pub id: LectureId,
    pub course_id: CourseId,
    pub title: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub course_id: CourseId,
    pub student_id: UserId,
    pub student_name: String,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub quiz_id: QuizId,
    pub student_id: UserId,
    pub score: f32,
    pub submitted_at: DateTime<Utc>,
}

/// Aggregate counts for the `view_analytics` intent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub courses: usize,
    pub quizzes: usize,
    pub assignments: usize,
    pub lectures: usize,
    pub enrollments: usize,
    pub submissions: usize,
}
