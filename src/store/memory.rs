//! In-memory domain store
//!
//! Insertion-ordered vectors behind a single RwLock. This is the shared
//! mutable state two concurrent commands may race on; no isolation is
//! promised across a multi-task command (accepted design gap).

use super::{DomainStore, NewAssignment, NewCourse, NewLecture, NewQuestion, NewQuiz};
use crate::core::error::{CopilotError, Result};
use crate::core::types::{Actor, AssignmentId, CourseId, LectureId, QuizId, UserId};
use crate::model::{
    Assignment, Command, Course, DashboardStats, Enrollment, Lecture, Question, Quiz, Submission,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Default)]
struct Inner {
    courses: Vec<Course>,
    quizzes: Vec<Quiz>,
    questions: Vec<Question>,
    assignments: Vec<Assignment>,
    lectures: Vec<Lecture>,
    enrollments: Vec<Enrollment>,
    submissions: Vec<Submission>,
    commands: Vec<Command>,
}

impl Inner {
    /// Course ids visible to the actor
    fn visible_courses(&self, actor: &Actor) -> HashSet<CourseId> {
        self.courses
            .iter()
            .filter(|c| actor.is_elevated() || c.owner_id == actor.id)
            .map(|c| c.id)
            .collect()
    }

    fn visible_quizzes(&self, actor: &Actor) -> Vec<Quiz> {
        let courses = self.visible_courses(actor);
        self.quizzes
            .iter()
            .filter(|q| courses.contains(&q.course_id))
            .cloned()
            .collect()
    }
}

/// Thread-safe in-memory implementation of [`DomainStore`]
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an enrollment directly (enrollment creation is outside the
    /// command pipeline's write surface)
    pub fn add_enrollment(&self, enrollment: Enrollment) {
        self.write().enrollments.push(enrollment);
    }

    /// Seed a submission directly
    pub fn add_submission(&self, submission: Submission) {
        self.write().submissions.push(submission);
    }

    // A poisoned lock means a panic mid-write; the data is still the
    // best record we have, so keep serving it.
    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DomainStore for MemoryStore {
    async fn create_course(&self, new: NewCourse) -> Result<Course> {
        let course = Course {
            id: CourseId::new(),
            owner_id: new.owner_id,
            title: new.title,
            code: new.code,
            description: new.description,
            created_at: Utc::now(),
        };
        self.write().courses.push(course.clone());
        Ok(course)
    }

    async fn create_quiz(&self, new: NewQuiz) -> Result<Quiz> {
        let quiz = Quiz {
            id: QuizId::new(),
            course_id: new.course_id,
            title: new.title,
            topic: new.topic,
            status: new.status,
            public_link: None,
            created_at: Utc::now(),
        };
        self.write().quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn add_quiz_question(&self, new: NewQuestion) -> Result<Question> {
        let mut inner = self.write();
        if !inner.quizzes.iter().any(|q| q.id == new.quiz_id) {
            return Err(CopilotError::NotFound(format!("quiz {}", new.quiz_id)));
        }
        let question = Question {
            id: crate::core::types::QuestionId::new(),
            quiz_id: new.quiz_id,
            prompt: new.prompt,
            options: new.options,
            answer: new.answer,
            created_at: Utc::now(),
        };
        inner.questions.push(question.clone());
        Ok(question)
    }

    async fn create_assignment(&self, new: NewAssignment) -> Result<Assignment> {
        let assignment = Assignment {
            id: AssignmentId::new(),
            course_id: new.course_id,
            title: new.title,
            description: new.description,
            due_at: new.due_at,
            status: new.status,
            created_at: Utc::now(),
        };
        self.write().assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn create_lecture(&self, new: NewLecture) -> Result<Lecture> {
        let lecture = Lecture {
            id: LectureId::new(),
            course_id: new.course_id,
            title: new.title,
            scheduled_at: new.scheduled_at,
            created_at: Utc::now(),
        };
        self.write().lectures.push(lecture.clone());
        Ok(lecture)
    }

    async fn update_quiz(&self, quiz: Quiz) -> Result<Quiz> {
        let mut inner = self.write();
        let slot = inner
            .quizzes
            .iter_mut()
            .find(|q| q.id == quiz.id)
            .ok_or_else(|| CopilotError::NotFound(format!("quiz {}", quiz.id)))?;
        *slot = quiz.clone();
        Ok(quiz)
    }

    async fn delete_course(&self, id: CourseId) -> Result<()> {
        let mut inner = self.write();
        if !inner.courses.iter().any(|c| c.id == id) {
            return Err(CopilotError::NotFound(format!("course {}", id)));
        }
        let quiz_ids: HashSet<QuizId> = inner
            .quizzes
            .iter()
            .filter(|q| q.course_id == id)
            .map(|q| q.id)
            .collect();
        inner.courses.retain(|c| c.id != id);
        inner.quizzes.retain(|q| q.course_id != id);
        inner.questions.retain(|q| !quiz_ids.contains(&q.quiz_id));
        inner.assignments.retain(|a| a.course_id != id);
        inner.lectures.retain(|l| l.course_id != id);
        inner.enrollments.retain(|e| e.course_id != id);
        inner.submissions.retain(|s| !quiz_ids.contains(&s.quiz_id));
        Ok(())
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<()> {
        let mut inner = self.write();
        if !inner.quizzes.iter().any(|q| q.id == id) {
            return Err(CopilotError::NotFound(format!("quiz {}", id)));
        }
        inner.quizzes.retain(|q| q.id != id);
        inner.questions.retain(|q| q.quiz_id != id);
        inner.submissions.retain(|s| s.quiz_id != id);
        Ok(())
    }

    async fn delete_assignment(&self, id: AssignmentId) -> Result<()> {
        let mut inner = self.write();
        if !inner.assignments.iter().any(|a| a.id == id) {
            return Err(CopilotError::NotFound(format!("assignment {}", id)));
        }
        inner.assignments.retain(|a| a.id != id);
        Ok(())
    }

    async fn delete_lecture(&self, id: LectureId) -> Result<()> {
        let mut inner = self.write();
        if !inner.lectures.iter().any(|l| l.id == id) {
            return Err(CopilotError::NotFound(format!("lecture {}", id)));
        }
        inner.lectures.retain(|l| l.id != id);
        Ok(())
    }

    async fn get_courses(&self, actor: &Actor) -> Result<Vec<Course>> {
        let inner = self.read();
        Ok(inner
            .courses
            .iter()
            .filter(|c| actor.is_elevated() || c.owner_id == actor.id)
            .cloned()
            .collect())
    }

    async fn get_quizzes(&self, actor: &Actor) -> Result<Vec<Quiz>> {
        Ok(self.read().visible_quizzes(actor))
    }

    async fn get_assignments(&self, actor: &Actor) -> Result<Vec<Assignment>> {
        let inner = self.read();
        let courses = inner.visible_courses(actor);
        Ok(inner
            .assignments
            .iter()
            .filter(|a| courses.contains(&a.course_id))
            .cloned()
            .collect())
    }

    async fn get_lectures(&self, actor: &Actor) -> Result<Vec<Lecture>> {
        let inner = self.read();
        let courses = inner.visible_courses(actor);
        Ok(inner
            .lectures
            .iter()
            .filter(|l| courses.contains(&l.course_id))
            .cloned()
            .collect())
    }

    async fn get_enrollments(&self, actor: &Actor) -> Result<Vec<Enrollment>> {
        let inner = self.read();
        let courses = inner.visible_courses(actor);
        Ok(inner
            .enrollments
            .iter()
            .filter(|e| courses.contains(&e.course_id))
            .cloned()
            .collect())
    }

    async fn get_quiz_submissions(&self, actor: &Actor) -> Result<Vec<Submission>> {
        let inner = self.read();
        let quizzes: HashSet<QuizId> = inner.visible_quizzes(actor).iter().map(|q| q.id).collect();
        Ok(inner
            .submissions
            .iter()
            .filter(|s| quizzes.contains(&s.quiz_id))
            .cloned()
            .collect())
    }

    async fn get_quiz_questions(&self, quiz_id: QuizId) -> Result<Vec<Question>> {
        let inner = self.read();
        Ok(inner
            .questions
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn generate_quiz_public_link(&self, id: QuizId) -> Result<Quiz> {
        let mut inner = self.write();
        let quiz = inner
            .quizzes
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| CopilotError::NotFound(format!("quiz {}", id)))?;
        if quiz.public_link.is_none() {
            // Slug derived from the id so regeneration is idempotent
            quiz.public_link = Some(format!("/public/quiz/{}", quiz.id.0.simple()));
        }
        Ok(quiz.clone())
    }

    async fn get_dashboard_stats(&self, actor: &Actor) -> Result<DashboardStats> {
        let inner = self.read();
        let courses = inner.visible_courses(actor);
        let quizzes: HashSet<QuizId> = inner.visible_quizzes(actor).iter().map(|q| q.id).collect();
        Ok(DashboardStats {
            courses: courses.len(),
            quizzes: quizzes.len(),
            assignments: inner
                .assignments
                .iter()
                .filter(|a| courses.contains(&a.course_id))
                .count(),
            lectures: inner
                .lectures
                .iter()
                .filter(|l| courses.contains(&l.course_id))
                .count(),
            enrollments: inner
                .enrollments
                .iter()
                .filter(|e| courses.contains(&e.course_id))
                .count(),
            submissions: inner
                .submissions
                .iter()
                .filter(|s| quizzes.contains(&s.quiz_id))
                .count(),
        })
    }

    async fn save_command(&self, command: Command) -> Result<()> {
        self.write().commands.push(command);
        Ok(())
    }

    async fn update_command(&self, command: Command) -> Result<()> {
        let mut inner = self.write();
        let slot = inner
            .commands
            .iter_mut()
            .find(|c| c.id == command.id)
            .ok_or_else(|| CopilotError::NotFound(format!("command {}", command.id)))?;
        *slot = command;
        Ok(())
    }

    async fn get_commands(&self, user_id: UserId) -> Result<Vec<Command>> {
        let inner = self.read();
        let mut commands: Vec<Command> = inner
            .commands
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        commands.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Role;
    use crate::model::PublishStatus;

    fn instructor() -> Actor {
        Actor::new(UserId::new(), Role::Instructor)
    }

    async fn seed_course(store: &MemoryStore, owner: UserId, title: &str) -> Course {
        store
            .create_course(NewCourse {
                owner_id: owner,
                title: title.into(),
                code: "TST-001".into(),
                description: String::new(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_course_scoping() {
        let store = MemoryStore::new();
        let alice = instructor();
        let bob = instructor();
        seed_course(&store, alice.id, "Biology 101").await;
        seed_course(&store, bob.id, "Chemistry 200").await;

        let visible = store.get_courses(&alice).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Biology 101");

        let admin = Actor::new(UserId::new(), Role::Admin);
        assert_eq!(store.get_courses(&admin).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_quiz_scoping_is_transitive() {
        let store = MemoryStore::new();
        let alice = instructor();
        let bob = instructor();
        let alice_course = seed_course(&store, alice.id, "Biology 101").await;
        let bob_course = seed_course(&store, bob.id, "Chemistry 200").await;

        for (course, title) in [(&alice_course, "Cells"), (&bob_course, "Acids")] {
            store
                .create_quiz(NewQuiz {
                    course_id: course.id,
                    title: title.into(),
                    topic: None,
                    status: PublishStatus::Draft,
                })
                .await
                .unwrap();
        }

        let quizzes = store.get_quizzes(&alice).await.unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].title, "Cells");
    }

    #[tokio::test]
    async fn test_delete_course_cascades() {
        let store = MemoryStore::new();
        let alice = instructor();
        let course = seed_course(&store, alice.id, "Biology 101").await;
        let quiz = store
            .create_quiz(NewQuiz {
                course_id: course.id,
                title: "Cells".into(),
                topic: None,
                status: PublishStatus::Draft,
            })
            .await
            .unwrap();
        store
            .add_quiz_question(NewQuestion {
                quiz_id: quiz.id,
                prompt: "What is a cell?".into(),
                options: vec!["A".into(), "B".into()],
                answer: 0,
            })
            .await
            .unwrap();

        store.delete_course(course.id).await.unwrap();
        assert!(store.get_courses(&alice).await.unwrap().is_empty());
        assert!(store.get_quizzes(&alice).await.unwrap().is_empty());
        assert!(store.get_quiz_questions(quiz.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_quiz_is_not_found() {
        let store = MemoryStore::new();
        let err = store.delete_quiz(QuizId::new()).await.unwrap_err();
        assert!(matches!(err, CopilotError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_public_link_is_idempotent() {
        let store = MemoryStore::new();
        let alice = instructor();
        let course = seed_course(&store, alice.id, "Biology 101").await;
        let quiz = store
            .create_quiz(NewQuiz {
                course_id: course.id,
                title: "Cells".into(),
                topic: None,
                status: PublishStatus::Published,
            })
            .await
            .unwrap();

        let first = store.generate_quiz_public_link(quiz.id).await.unwrap();
        let second = store.generate_quiz_public_link(quiz.id).await.unwrap();
        assert_eq!(first.public_link, second.public_link);
        assert!(first.public_link.unwrap().starts_with("/public/quiz/"));
    }

    #[tokio::test]
    async fn test_command_history_most_recent_first() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let mut first = Command::new(user, "list my courses");
        first.created_at = Utc::now() - chrono::Duration::seconds(10);
        let second = Command::new(user, "create a quiz");
        store.save_command(first).await.unwrap();
        store.save_command(second).await.unwrap();

        let history = store.get_commands(user).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].raw_text, "create a quiz");
    }
}
