//! Before/after cue resolution.
//!
//! The cue before a paragraph is its predecessor's text, or the passage's
//! `before` field for the first paragraph. The cue after is symmetric,
//! falling back to `after` for the last paragraph.

use crate::error::{Result, VersedError};
use crate::model::Passage;
use crate::types::ParagraphId;

/// Both cues for one paragraph, as shown on a quiz screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cues<'a> {
    /// Text shown above the answer field.
    pub before: &'a str,
    /// Text shown below the answer field.
    pub after: &'a str,
}

fn locate(passage: &Passage, paragraph: ParagraphId) -> Result<usize> {
    passage
        .position_of(paragraph)
        .ok_or(VersedError::ParagraphNotFound {
            passage: passage.id,
            paragraph,
        })
}

/// Text shown before `paragraph`.
///
/// # Errors
/// Returns [`VersedError::ParagraphNotFound`] if the paragraph does not
/// belong to `passage`.
pub fn cue_before(passage: &Passage, paragraph: ParagraphId) -> Result<&str> {
    let index = locate(passage, paragraph)?;
    Ok(match index.checked_sub(1) {
        Some(prev) => &passage.paragraphs[prev].text,
        None => &passage.before,
    })
}

/// Text shown after `paragraph`.
///
/// # Errors
/// Returns [`VersedError::ParagraphNotFound`] if the paragraph does not
/// belong to `passage`.
pub fn cue_after(passage: &Passage, paragraph: ParagraphId) -> Result<&str> {
    let index = locate(passage, paragraph)?;
    Ok(match passage.paragraphs.get(index + 1) {
        Some(next) => &next.text,
        None => &passage.after,
    })
}

/// Resolve both cues at once.
///
/// # Errors
/// Returns [`VersedError::ParagraphNotFound`] if the paragraph does not
/// belong to `passage`.
pub fn cues(passage: &Passage, paragraph: ParagraphId) -> Result<Cues<'_>> {
    Ok(Cues {
        before: cue_before(passage, paragraph)?,
        after: cue_after(passage, paragraph)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PassageDraft;
    use chrono::Utc;

    fn passage(goal: &str) -> Passage {
        Passage::new(
            0,
            PassageDraft {
                before: "BEFORE".to_string(),
                goal: goal.to_string(),
                after: "AFTER".to_string(),
                reference: String::new(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn three_paragraph_boundaries() {
        let p = passage("zero\none\ntwo");
        let [p0, p1, p2] = [&p.paragraphs[0], &p.paragraphs[1], &p.paragraphs[2]];

        assert_eq!(cue_before(&p, p0.id).expect("p0"), p.before);
        assert_eq!(cue_before(&p, p1.id).expect("p1"), p0.text);
        assert_eq!(cue_before(&p, p2.id).expect("p2"), p1.text);
        assert_eq!(cue_after(&p, p0.id).expect("p0"), p1.text);
        assert_eq!(cue_after(&p, p1.id).expect("p1"), p2.text);
        assert_eq!(cue_after(&p, p2.id).expect("p2"), p.after);
    }

    #[test]
    fn single_paragraph_uses_both_fields() {
        let p = passage("Jesus wept.");
        let only = p.paragraphs[0].id;
        let c = cues(&p, only).expect("cues");
        assert_eq!(c.before, "BEFORE");
        assert_eq!(c.after, "AFTER");
    }

    #[test]
    fn foreign_paragraph_is_an_error() {
        let p = passage("a\nb");
        let other = passage("c");
        let err = cue_before(&p, other.paragraphs[0].id).expect_err("foreign");
        assert!(matches!(err, VersedError::ParagraphNotFound { .. }));
        assert!(cue_after(&p, other.paragraphs[0].id).is_err());
    }
}
