//! Entity resolution - maps a name hint to a concrete owned record
//!
//! Matching is an explicit ranking so resolution never depends on storage
//! iteration order: exact beats prefix beats substring, all
//! case-insensitive, ties broken by most-recent creation. With no hint
//! (or no match) the most recently created in-scope entity wins - "the
//! one the user probably just mentioned". An empty scope resolves to
//! `None`, never an error; callers turn that into a task failure.

use crate::core::error::Result;
use crate::core::types::Actor;
use crate::model::{Assignment, Course, Lecture, Quiz};
use crate::store::DomainStore;
use chrono::{DateTime, Utc};

/// How strongly a candidate's name matched the hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    Substring,
    Prefix,
    Exact,
}

fn rank_name(name: &str, hint: &str) -> Option<MatchRank> {
    let name = name.to_lowercase();
    let hint = hint.to_lowercase();
    if name == hint {
        Some(MatchRank::Exact)
    } else if name.starts_with(&hint) {
        Some(MatchRank::Prefix)
    } else if name.contains(&hint) {
        Some(MatchRank::Substring)
    } else {
        None
    }
}

/// Best rank across all of an entity's name fields
fn rank_entity(names: &[&str], hint: &str) -> Option<MatchRank> {
    names.iter().filter_map(|n| rank_name(n, hint)).max()
}

/// Pick the best candidate: highest rank, then most recently created.
/// Falls back to the most recently created entity when the hint is absent
/// or matches nothing.
fn pick<T>(
    items: Vec<T>,
    hint: Option<&str>,
    names: impl Fn(&T) -> Vec<String>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> Option<T> {
    if let Some(hint) = hint.filter(|h| !h.trim().is_empty()) {
        let best = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let fields = names(item);
                let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
                rank_entity(&refs, hint).map(|rank| (rank, created_at(item), i))
            })
            .max_by_key(|(rank, created, _)| (*rank, *created))
            .map(|(_, _, i)| i);
        if let Some(i) = best {
            let mut items = items;
            return Some(items.swap_remove(i));
        }
    }

    // No hint or nothing matched: most recently created in scope
    let latest = items
        .iter()
        .enumerate()
        .max_by_key(|(_, item)| created_at(item))
        .map(|(i, _)| i)?;
    let mut items = items;
    Some(items.swap_remove(latest))
}

/// Fuzzy lookup of platform entities scoped to the acting user
pub struct EntityResolver<'a> {
    store: &'a dyn DomainStore,
    actor: &'a Actor,
}

impl<'a> EntityResolver<'a> {
    pub fn new(store: &'a dyn DomainStore, actor: &'a Actor) -> Self {
        Self { store, actor }
    }

    /// Courses match on title and short code
    pub async fn resolve_course(&self, hint: Option<&str>) -> Result<Option<Course>> {
        let courses = self.store.get_courses(self.actor).await?;
        Ok(pick(
            courses,
            hint,
            |c| vec![c.title.clone(), c.code.clone()],
            |c| c.created_at,
        ))
    }

    pub async fn resolve_quiz(&self, hint: Option<&str>) -> Result<Option<Quiz>> {
        let quizzes = self.store.get_quizzes(self.actor).await?;
        Ok(pick(quizzes, hint, |q| vec![q.title.clone()], |q| q.created_at))
    }

    pub async fn resolve_assignment(&self, hint: Option<&str>) -> Result<Option<Assignment>> {
        let assignments = self.store.get_assignments(self.actor).await?;
        Ok(pick(
            assignments,
            hint,
            |a| vec![a.title.clone()],
            |a| a.created_at,
        ))
    }

    pub async fn resolve_lecture(&self, hint: Option<&str>) -> Result<Option<Lecture>> {
        let lectures = self.store.get_lectures(self.actor).await?;
        Ok(pick(
            lectures,
            hint,
            |l| vec![l.title.clone()],
            |l| l.created_at,
        ))
    }
}
