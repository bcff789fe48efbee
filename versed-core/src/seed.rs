//! Example content inserted on first launch.
//!
//! Examples are ordinary passages flagged `is_example`; their `index` is the
//! fixed order they are listed in here.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::Result;
use crate::model::{Passage, PassageDraft};
use crate::store::{PassageQuery, Repository, save_or_log};

/// One bundled example, in the same shape as the add-text form.
#[derive(Debug, Clone, Copy)]
pub struct ExampleText {
    /// Context before the goal.
    pub before: &'static str,
    /// The text to memorise.
    pub goal: &'static str,
    /// Context after the goal.
    pub after: &'static str,
    /// Citation label.
    pub reference: &'static str,
}

impl ExampleText {
    fn draft(&self) -> PassageDraft {
        PassageDraft {
            before: self.before.to_string(),
            goal: self.goal.to_string(),
            after: self.after.to_string(),
            reference: self.reference.to_string(),
        }
    }
}

/// The bundled examples, in learning order.
pub const EXAMPLES: &[ExampleText] = &[
    ExampleText {
        before: "Jesus said unto her, I am the resurrection, and the life.",
        goal: "Jesus wept.",
        after: "Then said the Jews, Behold how he loved him!",
        reference: "John 11:35",
    },
    ExampleText {
        before: "A Psalm of David.",
        goal: "The LORD is my shepherd; I shall not want.\n\
               He maketh me to lie down in green pastures: he leadeth me beside the still waters.",
        after: "He restoreth my soul.",
        reference: "Psalm 23:1-2",
    },
    ExampleText {
        before: "Ask, and it shall be given you; seek, and ye shall find.",
        goal: "Therefore all things whatsoever ye would that men should do to you, \
               do ye even so to them: for this is the law and the prophets.",
        after: "Enter ye in at the strait gate.",
        reference: "Matthew 7:12",
    },
    ExampleText {
        before: "",
        goal: "Four score and seven years ago our fathers brought forth on this continent, \
               a new nation, conceived in Liberty, and dedicated to the proposition that all men are created equal.\n\
               Now we are engaged in a great civil war, testing whether that nation, \
               or any nation so conceived and so dedicated, can long endure.",
        after: "We are met on a great battle-field of that war.",
        reference: "Gettysburg Address",
    },
];

/// Build the example passages, indexed by their position in [`EXAMPLES`].
#[must_use]
pub fn example_passages(now: DateTime<Utc>) -> Vec<Passage> {
    (0_i64..)
        .zip(EXAMPLES)
        .map(|(order, example)| Passage::example(order, example.draft(), now))
        .collect()
}

/// Insert the examples if the store has none. Returns how many were
/// inserted: `EXAMPLES.len()` on an empty store, `0` otherwise.
///
/// A failing save is logged; the inserts stay pending.
///
/// # Errors
/// Backend errors from the query or the inserts.
pub fn ensure_examples<R: Repository + ?Sized>(repo: &mut R, now: DateTime<Utc>) -> Result<usize> {
    if !repo.query(&PassageQuery::examples())?.is_empty() {
        return Ok(0);
    }

    let passages = example_passages(now);
    let inserted = passages.len();
    for passage in passages {
        repo.insert(passage)?;
    }
    save_or_log(repo, "seed examples");

    info!(inserted, "Inserted example passages");
    Ok(inserted)
}
