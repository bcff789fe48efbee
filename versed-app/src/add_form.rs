//! The add-text form.
//!
//! Four text fields; submit and reset are enabled as soon as any one of them
//! holds text. Submitting inserts a new user passage at the next index and
//! always leaves the form empty, whether or not the save went through.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use versed_core::error::{Result, VersedError};
use versed_core::model::{Passage, PassageDraft};
use versed_core::store::{self, Repository};
use versed_core::types::PassageId;

/// One of the form's four text fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormField {
    /// Context before the goal.
    Before,
    /// The text to memorise.
    Goal,
    /// Context after the goal.
    After,
    /// Citation label.
    Reference,
}

impl FormField {
    /// All fields in display order.
    pub const ALL: [Self; 4] = [Self::Before, Self::Goal, Self::After, Self::Reference];

    /// Section header.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Before => "Before",
            Self::Goal => "Goal",
            Self::After => "After",
            Self::Reference => "Reference",
        }
    }

    /// Placeholder shown in an empty field.
    #[must_use]
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Before => "(optional) the text just before",
            Self::Goal => "Paste or type the text to know",
            Self::After => "(optional) the text just after",
            Self::Reference => "e.g. Psalm 23:1",
        }
    }

    /// Help text for the info button, if the field has one.
    #[must_use]
    pub fn info(self) -> Option<&'static str> {
        match self {
            Self::Before => Some("Shown as a cue above your first paragraph."),
            Self::Goal => Some("Each line becomes a paragraph you are quizzed on."),
            Self::After => Some("Shown as a cue below your last paragraph."),
            Self::Reference => None,
        }
    }

    /// Minimum visible lines for the field's text box.
    #[must_use]
    pub fn min_lines(self) -> usize {
        match self {
            Self::Goal => 5,
            Self::Before | Self::After => 2,
            Self::Reference => 1,
        }
    }
}

/// State of the add-text form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddForm {
    draft: PassageDraft,
}

impl AddForm {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text of `field`.
    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Before => &self.draft.before,
            FormField::Goal => &self.draft.goal,
            FormField::After => &self.draft.after,
            FormField::Reference => &self.draft.reference,
        }
    }

    /// Replace the text of `field`.
    pub fn set(&mut self, field: FormField, text: impl Into<String>) {
        let slot = match field {
            FormField::Before => &mut self.draft.before,
            FormField::Goal => &mut self.draft.goal,
            FormField::After => &mut self.draft.after,
            FormField::Reference => &mut self.draft.reference,
        };
        *slot = text.into();
    }

    /// Whether all four fields are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draft.is_empty()
    }

    /// Whether the submit and reset actions are enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.is_empty()
    }

    /// Clear all four fields.
    pub fn reset(&mut self) {
        self.draft = PassageDraft::default();
    }

    /// Create a passage from the form and save it.
    ///
    /// The form is cleared by every enabled attempt. A failed save is logged
    /// and the passage stays pending in the repository.
    ///
    /// # Errors
    /// [`VersedError::EmptySubmission`] when disabled (the form is left as
    /// is), or the error from computing the index or inserting.
    pub fn submit<R: Repository + ?Sized>(
        &mut self,
        repo: &mut R,
        now: DateTime<Utc>,
    ) -> Result<PassageId> {
        if self.is_empty() {
            return Err(VersedError::EmptySubmission);
        }
        let draft = std::mem::take(&mut self.draft);

        let index = store::next_user_index(repo)?;
        let passage = Passage::new(index, draft, now);
        let id = passage.id;
        let paragraphs = passage.paragraphs.len();
        repo.insert(passage)?;
        let saved = store::save_or_log(repo, "add passage");

        info!(passage = %id, index, paragraphs, saved, "Added passage");
        Ok(id)
    }
}
