//! Domain store seam
//!
//! The command pipeline talks to the platform's data layer through this
//! trait so handlers stay independent of the backing storage. All read
//! methods are scoped by the acting user: elevated actors see everything,
//! instructors see their own courses and the records under them. No
//! transactional guarantee is made across calls; a multi-step creation
//! (quiz plus generated questions) is a sequence of independent writes.

pub mod memory;

pub use memory::MemoryStore;

use crate::core::error::Result;
use crate::core::types::{Actor, AssignmentId, CourseId, LectureId, QuizId, UserId};
use crate::model::{
    Assignment, Command, Course, DashboardStats, Enrollment, Lecture, PublishStatus, Question,
    Quiz, Submission,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Input for `create_course`; id and timestamp are assigned by the store
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub owner_id: UserId,
    pub title: String,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub course_id: CourseId,
    pub title: String,
    pub topic: Option<String>,
    pub status: PublishStatus,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub quiz_id: QuizId,
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: usize,
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub due_at: DateTime<Utc>,
    pub status: PublishStatus,
}

#[derive(Debug, Clone)]
pub struct NewLecture {
    pub course_id: CourseId,
    pub title: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Typed CRUD over platform records plus the command audit surface
#[async_trait]
pub trait DomainStore: Send + Sync {
    async fn create_course(&self, new: NewCourse) -> Result<Course>;
    async fn create_quiz(&self, new: NewQuiz) -> Result<Quiz>;
    async fn add_quiz_question(&self, new: NewQuestion) -> Result<Question>;
    async fn create_assignment(&self, new: NewAssignment) -> Result<Assignment>;
    async fn create_lecture(&self, new: NewLecture) -> Result<Lecture>;

    async fn update_quiz(&self, quiz: Quiz) -> Result<Quiz>;
    /// Deletes the course and every quiz, assignment, lecture, and
    /// enrollment under it
    async fn delete_course(&self, id: CourseId) -> Result<()>;
    async fn delete_quiz(&self, id: QuizId) -> Result<()>;
    async fn delete_assignment(&self, id: AssignmentId) -> Result<()>;
    async fn delete_lecture(&self, id: LectureId) -> Result<()>;

    async fn get_courses(&self, actor: &Actor) -> Result<Vec<Course>>;
    async fn get_quizzes(&self, actor: &Actor) -> Result<Vec<Quiz>>;
    async fn get_assignments(&self, actor: &Actor) -> Result<Vec<Assignment>>;
    async fn get_lectures(&self, actor: &Actor) -> Result<Vec<Lecture>>;
    async fn get_enrollments(&self, actor: &Actor) -> Result<Vec<Enrollment>>;
    async fn get_quiz_submissions(&self, actor: &Actor) -> Result<Vec<Submission>>;
    async fn get_quiz_questions(&self, quiz_id: QuizId) -> Result<Vec<Question>>;

    /// Assigns (or returns the existing) public slug for a quiz
    async fn generate_quiz_public_link(&self, id: QuizId) -> Result<Quiz>;
    async fn get_dashboard_stats(&self, actor: &Actor) -> Result<DashboardStats>;

    async fn save_command(&self, command: Command) -> Result<()>;
    async fn update_command(&self, command: Command) -> Result<()>;
    /// All commands for one user, most recent first
    async fn get_commands(&self, user_id: UserId) -> Result<Vec<Command>>;
}
