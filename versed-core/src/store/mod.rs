//! Persistence boundary.
//!
//! [`Repository`] is the typed insert / save / query surface the rest of
//! Versed talks to. Writes are pending until [`Repository::save`]; reads see
//! pending writes. Two implementations ship:
//!
//! - [`MemoryStore`]: snapshots in a `Vec`, for tests and previews.
//! - [`SqliteStore`]: one SQLite database per user library.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::{Result, VersedError};
use crate::model::Passage;
use crate::scheduler::{ReviewOutcome, Scheduler};
use crate::types::{ParagraphId, PassageId, QuizFeedback};

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Sort order for passage queries. Ties are broken by creation time, then ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassageSort {
    /// Lowest index first (display order, example seed order).
    #[default]
    IndexAscending,
    /// Highest index first (next-index computation).
    IndexDescending,
}

/// Predicate and sort for [`Repository::query`]. `None` filters match anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassageQuery {
    /// Match on [`Passage::is_example`].
    pub is_example: Option<bool>,
    /// Match on [`Passage::is_new`].
    pub is_new: Option<bool>,
    /// Result order.
    pub sort: PassageSort,
}

impl PassageQuery {
    /// Every passage, index ascending.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// User (non-example) passages, index ascending.
    #[must_use]
    pub fn user() -> Self {
        Self {
            is_example: Some(false),
            ..Self::default()
        }
    }

    /// Example passages in seed order.
    #[must_use]
    pub fn examples() -> Self {
        Self {
            is_example: Some(true),
            ..Self::default()
        }
    }

    /// User passages the user has not interacted with yet.
    #[must_use]
    pub fn new_user_texts() -> Self {
        Self {
            is_new: Some(true),
            ..Self::user()
        }
    }

    /// Same predicate with a different order.
    #[must_use]
    pub fn sorted(self, sort: PassageSort) -> Self {
        Self { sort, ..self }
    }

    /// Whether `passage` satisfies the predicate.
    #[must_use]
    pub fn matches(&self, passage: &Passage) -> bool {
        self.is_example.is_none_or(|e| passage.is_example == e)
            && self.is_new.is_none_or(|n| passage.is_new == n)
    }

    /// Sort `passages` in place by this query's order.
    pub fn sort(&self, passages: &mut [Passage]) {
        passages.sort_by(|a, b| {
            let by_index = match self.sort {
                PassageSort::IndexAscending => a.index.cmp(&b.index),
                PassageSort::IndexDescending => b.index.cmp(&a.index),
            };
            by_index
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// Typed storage for passages (paragraphs travel inside their passage).
pub trait Repository {
    /// Add a new passage.
    ///
    /// # Errors
    /// [`VersedError::DuplicateIndex`] if a user passage already holds the
    /// index, or a backend error.
    fn insert(&mut self, passage: Passage) -> Result<()>;

    /// Replace the stored state of an existing passage.
    ///
    /// # Errors
    /// [`VersedError::PassageNotFound`] if no passage has this ID, or a
    /// backend error.
    fn update(&mut self, passage: &Passage) -> Result<()>;

    /// Delete a passage and its paragraphs. Returns `true` if it existed.
    ///
    /// # Errors
    /// Backend errors only.
    fn delete(&mut self, id: PassageId) -> Result<bool>;

    /// Fetch one passage.
    ///
    /// # Errors
    /// Backend errors only.
    fn get(&self, id: PassageId) -> Result<Option<Passage>>;

    /// Fetch passages matching `query`, in its order.
    ///
    /// # Errors
    /// Backend errors only.
    fn query(&self, query: &PassageQuery) -> Result<Vec<Passage>>;

    /// Flush pending changes.
    ///
    /// # Errors
    /// Backend errors; pending changes stay pending.
    fn save(&mut self) -> Result<()>;

    /// Discard pending changes.
    ///
    /// # Errors
    /// Backend errors only.
    fn rollback(&mut self) -> Result<()>;

    /// Whether there are unsaved changes.
    fn has_changes(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Operations over any repository
// ---------------------------------------------------------------------------

/// Index for the next user passage: one past the highest existing user
/// index, or `0` for an empty library. Examples are ignored.
///
/// # Errors
/// Backend errors from the query.
pub fn next_user_index<R: Repository + ?Sized>(repo: &R) -> Result<i64> {
    let newest_first = repo.query(&PassageQuery::user().sorted(PassageSort::IndexDescending))?;
    Ok(newest_first.first().map_or(0, |p| p.index + 1))
}

/// Flush pending changes, logging (not returning) a failure.
///
/// Returns `true` if the save succeeded.
pub fn save_or_log<R: Repository + ?Sized>(repo: &mut R, context: &str) -> bool {
    match repo.save() {
        Ok(()) => true,
        Err(e) => {
            warn!(context, error = %e, "Failed to save");
            false
        }
    }
}

/// Load a passage or fail with [`VersedError::PassageNotFound`].
///
/// # Errors
/// `PassageNotFound`, or backend errors.
pub fn require<R: Repository + ?Sized>(repo: &R, id: PassageId) -> Result<Passage> {
    repo.get(id)?.ok_or(VersedError::PassageNotFound(id))
}

/// Apply quiz feedback to one stored paragraph and write the passage back
/// (pending until saved).
///
/// # Errors
/// `PassageNotFound`, `ParagraphNotFound`, or backend errors.
pub fn record_feedback<R: Repository + ?Sized>(
    repo: &mut R,
    scheduler: &Scheduler,
    passage: PassageId,
    paragraph: ParagraphId,
    feedback: QuizFeedback,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome> {
    let mut stored = require(repo, passage)?;
    let target = stored
        .paragraph_mut(paragraph)
        .ok_or(VersedError::ParagraphNotFound { passage, paragraph })?;
    let outcome = scheduler.update(target, feedback, now);
    repo.update(&stored)?;
    Ok(outcome)
}

/// Clear a passage's `is_new` flag (pending until saved). Returns `true` if
/// the flag was set.
///
/// # Errors
/// `PassageNotFound`, or backend errors.
pub fn mark_seen<R: Repository + ?Sized>(repo: &mut R, id: PassageId) -> Result<bool> {
    let mut passage = require(repo, id)?;
    if !passage.is_new {
        return Ok(false);
    }
    passage.is_new = false;
    repo.update(&passage)?;
    Ok(true)
}
