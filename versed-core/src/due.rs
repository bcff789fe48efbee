//! Due queue: which paragraph to quiz next.
//!
//! Only user passages take part. Paragraphs are ordered by how long they
//! have been due (earliest due date first), ties broken by passage index
//! and then by position within the passage, so the order is fully
//! deterministic.

use chrono::{DateTime, Utc};

use crate::model::{Paragraph, Passage};
use crate::types::{ParagraphId, PassageId};

/// A due paragraph together with the passage it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct DueParagraph<'a> {
    /// The owning passage.
    pub passage: &'a Passage,
    /// The paragraph to quiz.
    pub paragraph: &'a Paragraph,
}

impl DueParagraph<'_> {
    /// `(passage, paragraph)` identifiers, for handing to a quiz session.
    #[must_use]
    pub fn ids(&self) -> (PassageId, ParagraphId) {
        (self.passage.id, self.paragraph.id)
    }
}

/// All due paragraphs of user passages, longest-due first.
#[must_use]
pub fn due_paragraphs(passages: &[Passage], now: DateTime<Utc>) -> Vec<DueParagraph<'_>> {
    let mut due: Vec<DueParagraph<'_>> = passages
        .iter()
        .filter(|p| !p.is_example)
        .flat_map(|passage| {
            passage
                .paragraphs
                .iter()
                .filter(move |para| para.is_due(now))
                .map(move |paragraph| DueParagraph { passage, paragraph })
        })
        .collect();

    due.sort_by_key(|d| (d.paragraph.due_date, d.passage.index, d.paragraph.position));
    due
}

/// The paragraph to quiz next, if any is due.
#[must_use]
pub fn next_due(passages: &[Passage], now: DateTime<Utc>) -> Option<DueParagraph<'_>> {
    due_paragraphs(passages, now).into_iter().next()
}

/// Number of due paragraphs across user passages.
#[must_use]
pub fn count_due(passages: &[Passage], now: DateTime<Utc>) -> usize {
    passages
        .iter()
        .filter(|p| !p.is_example)
        .flat_map(|p| &p.paragraphs)
        .filter(|para| para.is_due(now))
        .count()
}

/// Earliest upcoming due date among paragraphs not yet due, for scheduling
/// a refresh of the due badge.
#[must_use]
pub fn next_due_date(passages: &[Passage], now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    passages
        .iter()
        .filter(|p| !p.is_example)
        .flat_map(|p| &p.paragraphs)
        .map(|para| para.due_date)
        .filter(|due| *due > now)
        .min()
}
