//! Dashboard queries: the main screen's badges, lists and next quiz.

use chrono::{DateTime, Utc};
use tracing::info;

use versed_core::due;
use versed_core::error::Result;
use versed_core::model::Passage;
use versed_core::store::{self, PassageQuery, Repository};
use versed_core::types::{ParagraphId, PassageId};

/// Badge text shown while any user passage is still new.
pub const NEW_BADGE: &str = "New";

/// [`NEW_BADGE`] if any user passage has not been opened or quizzed yet.
///
/// # Errors
/// Backend errors.
pub fn new_texts_badge<R: Repository + ?Sized>(repo: &R) -> Result<Option<&'static str>> {
    let fresh = repo.query(&PassageQuery::new_user_texts())?;
    Ok((!fresh.is_empty()).then_some(NEW_BADGE))
}

/// Number of user paragraphs due at `now`.
///
/// # Errors
/// Backend errors.
pub fn paragraphs_due<R: Repository + ?Sized>(repo: &R, now: DateTime<Utc>) -> Result<usize> {
    let passages = repo.query(&PassageQuery::user())?;
    Ok(due::count_due(&passages, now))
}

/// User passages in index order.
///
/// # Errors
/// Backend errors.
pub fn user_texts<R: Repository + ?Sized>(repo: &R) -> Result<Vec<Passage>> {
    repo.query(&PassageQuery::user())
}

/// Example passages in seed order.
///
/// # Errors
/// Backend errors.
pub fn example_texts<R: Repository + ?Sized>(repo: &R) -> Result<Vec<Passage>> {
    repo.query(&PassageQuery::examples())
}

/// The paragraph that has been due longest, if any.
///
/// # Errors
/// Backend errors.
pub fn next_quiz<R: Repository + ?Sized>(
    repo: &R,
    now: DateTime<Utc>,
) -> Result<Option<(PassageId, ParagraphId)>> {
    let passages = repo.query(&PassageQuery::user())?;
    Ok(due::next_due(&passages, now).map(|d| d.ids()))
}

/// The earliest due date still in the future, for refreshing the due count.
///
/// # Errors
/// Backend errors.
pub fn next_review_at<R: Repository + ?Sized>(
    repo: &R,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    let passages = repo.query(&PassageQuery::user())?;
    Ok(due::next_due_date(&passages, now))
}

/// Open a passage for reading, clearing its "new" flag.
///
/// # Errors
/// `PassageNotFound`, or backend errors.
pub fn open_text<R: Repository + ?Sized>(repo: &mut R, id: PassageId) -> Result<Passage> {
    if store::mark_seen(repo, id)? {
        store::save_or_log(repo, "open passage");
    }
    store::require(repo, id)
}

/// Delete a passage and its paragraphs. Returns `false` if it did not exist.
///
/// # Errors
/// Backend errors.
pub fn delete_text<R: Repository + ?Sized>(repo: &mut R, id: PassageId) -> Result<bool> {
    let removed = repo.delete(id)?;
    if removed {
        let saved = store::save_or_log(repo, "delete passage");
        info!(passage = %id, saved, "Deleted passage");
    }
    Ok(removed)
}
