//! Paragraph: the unit that is actually quizzed.
//!
//! A paragraph is one chunk of its passage's goal text plus the review
//! state the scheduler maintains for it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ParagraphId, PassageId};

/// One quizzable chunk of a passage's goal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Unique identifier for this paragraph.
    pub id: ParagraphId,
    /// The owning passage. Lookup only; the passage owns the paragraph.
    pub passage: PassageId,
    /// 0-based position within the owning passage.
    pub position: usize,
    /// The exact text to be recalled, including its trailing line break(s).
    pub text: String,
    /// Next scheduled review.
    pub due_date: DateTime<Utc>,
    /// Current inter-review interval in seconds (0 until the first `good`).
    pub interval_secs: i64,
    /// How many times feedback has been recorded.
    pub review_count: u32,
    /// How many of those were `retry`.
    pub lapse_count: u32,
    /// When feedback was last recorded.
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl Paragraph {
    /// Create a paragraph that is due immediately (at `created_at`).
    #[must_use]
    pub fn new(
        passage: PassageId,
        position: usize,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ParagraphId::new(),
            passage,
            position,
            text: text.into(),
            due_date: created_at,
            interval_secs: 0,
            review_count: 0,
            lapse_count: 0,
            last_reviewed: None,
        }
    }

    /// Current interval as a [`Duration`].
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::seconds(self.interval_secs)
    }

    /// Whether the paragraph should be quizzed at `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_date <= now
    }

    /// Text without the trailing line break(s) kept for reconstruction.
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.text.trim_end()
    }
}

/// Split goal text into paragraph texts at line breaks.
///
/// Blank lines never start a paragraph: they stick to the preceding one
/// (leading blanks go to the first). Concatenating the result yields
/// `goal` exactly.
#[must_use]
pub fn split_paragraphs(goal: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut leading = String::new();

    for line in goal.split_inclusive('\n') {
        if line.trim().is_empty() {
            match parts.last_mut() {
                Some(last) => last.push_str(line),
                None => leading.push_str(line),
            }
        } else {
            let mut part = std::mem::take(&mut leading);
            part.push_str(line);
            parts.push(part);
        }
    }

    // Whitespace-only goal: keep it as a single paragraph.
    if parts.is_empty() && !leading.is_empty() {
        parts.push(leading);
    }
    parts
}

/// Build the paragraphs of a passage from its goal text.
#[must_use]
pub fn decompose(passage: PassageId, goal: &str, created_at: DateTime<Utc>) -> Vec<Paragraph> {
    split_paragraphs(goal)
        .into_iter()
        .enumerate()
        .map(|(position, text)| Paragraph::new(passage, position, text, created_at))
        .collect()
}
