//! Passage: a user's full text-to-memorise plus its context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::paragraph::{Paragraph, decompose};
use crate::types::{ParagraphId, PassageId};

/// Longest row title before it is cut with an ellipsis.
const ROW_TITLE_MAX_CHARS: usize = 40;

/// The four free-text fields a passage is created from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageDraft {
    /// Context shown before the first paragraph.
    pub before: String,
    /// The text to memorise.
    pub goal: String,
    /// Context shown after the last paragraph.
    pub after: String,
    /// Citation label, e.g. "Psalm 23:1".
    pub reference: String,
}

impl PassageDraft {
    /// Draft with only the goal filled in.
    #[must_use]
    pub fn goal(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            ..Self::default()
        }
    }

    /// Whether all four fields are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [&self.before, &self.goal, &self.after, &self.reference]
            .iter()
            .all(|s| s.is_empty())
    }
}

/// A unit of text to memorise, decomposed into ordered paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Unique identifier.
    pub id: PassageId,
    /// Ordering key. For user passages: unique, assigned `max + 1`.
    /// For examples: the fixed seed order.
    pub index: i64,
    /// Context cue before the goal text.
    pub before: String,
    /// The text to memorise.
    pub goal: String,
    /// Context cue after the goal text.
    pub after: String,
    /// Citation label.
    pub reference: String,
    /// Seeded demo content rather than user content.
    pub is_example: bool,
    /// True until the user has interacted with the passage once.
    pub is_new: bool,
    /// When the passage was created.
    pub created_at: DateTime<Utc>,
    /// The goal text split into quizzable units, in author order.
    pub paragraphs: Vec<Paragraph>,
}

impl Passage {
    /// Create a user passage from a draft, decomposing its goal.
    #[must_use]
    pub fn new(index: i64, draft: PassageDraft, created_at: DateTime<Utc>) -> Self {
        let id = PassageId::new();
        let paragraphs = decompose(id, &draft.goal, created_at);
        Self {
            id,
            index,
            before: draft.before,
            goal: draft.goal,
            after: draft.after,
            reference: draft.reference,
            is_example: false,
            is_new: true,
            created_at,
            paragraphs,
        }
    }

    /// Create an example passage with a fixed seed order.
    #[must_use]
    pub fn example(order: i64, draft: PassageDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            is_example: true,
            is_new: false,
            ..Self::new(order, draft, created_at)
        }
    }

    /// Position of a paragraph within this passage.
    #[must_use]
    pub fn position_of(&self, paragraph: ParagraphId) -> Option<usize> {
        self.paragraphs.iter().position(|p| p.id == paragraph)
    }

    /// Look up a paragraph by ID.
    #[must_use]
    pub fn paragraph(&self, paragraph: ParagraphId) -> Option<&Paragraph> {
        self.paragraphs.iter().find(|p| p.id == paragraph)
    }

    /// Look up a paragraph by ID for mutation.
    pub fn paragraph_mut(&mut self, paragraph: ParagraphId) -> Option<&mut Paragraph> {
        self.paragraphs.iter_mut().find(|p| p.id == paragraph)
    }

    /// Concatenation of all paragraph texts; equals `goal` for any
    /// passage built through [`Passage::new`].
    #[must_use]
    pub fn reconstructed_goal(&self) -> String {
        self.paragraphs.iter().map(|p| p.text.as_str()).collect()
    }

    /// Short label for lists: the reference, else the first non-blank line
    /// of the goal, before or after text.
    #[must_use]
    pub fn row_title(&self) -> String {
        let source = [&self.reference, &self.goal, &self.before, &self.after]
            .into_iter()
            .find_map(|field| field.lines().map(str::trim).find(|l| !l.is_empty()))
            .unwrap_or_default();

        if source.chars().count() > ROW_TITLE_MAX_CHARS {
            let cut: String = source.chars().take(ROW_TITLE_MAX_CHARS).collect();
            format!("{}…", cut.trim_end())
        } else {
            source.to_string()
        }
    }
}
