//! Quiz session state machine.
//!
//! One paragraph is quizzed at a time:
//!
//! ```text
//!   Idle ──start──▶ Prompting ──begin_input──▶ Transcribing ──compare──▶ Comparing
//!    ▲                 │ choose_sense              │ edit                    │
//!    │                 ▼                           ▼                         │
//!    │              Prompting                 Transcribing      finish_comparing
//!    │                                                                       ▼
//!    └──────────────────────────────── grade ◀──────────────────────── Feedback
//! ```
//!
//! `cancel` returns to `Idle` from anywhere else. An action that does not
//! fit the current state is rejected with
//! [`VersedError::InvalidTransition`] and the session is left untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use versed_core::cue;
use versed_core::error::{Result, VersedError};
use versed_core::scheduler::{ReviewOutcome, Scheduler};
use versed_core::store::{self, Repository};
use versed_core::types::{ParagraphId, PassageId, QuizFeedback};

/// Where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    /// No paragraph selected.
    #[default]
    Idle,
    /// Cues shown; the user picks how to be prompted and how to answer.
    Prompting,
    /// The user is reciting.
    Transcribing,
    /// The answer is revealed next to the transcript.
    Comparing,
    /// Waiting for `good` or `retry`.
    Feedback,
}

impl QuizState {
    /// Name used in transition errors and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Prompting => "prompting",
            Self::Transcribing => "transcribing",
            Self::Comparing => "comparing",
            Self::Feedback => "feedback",
        }
    }
}

impl fmt::Display for QuizState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the cues are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptSense {
    /// Cues are read aloud.
    Hear,
    /// Cues are shown as text.
    #[default]
    Read,
}

/// How the user recites the paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Spoken and transcribed by the shell.
    Speak,
    /// Typed.
    Type,
}

/// Everything the quiz screen shows for the current paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCard {
    /// Passage being quizzed.
    pub passage: PassageId,
    /// Paragraph being quizzed.
    pub paragraph: ParagraphId,
    /// Passage reference, for the title.
    pub reference: String,
    /// Text above the answer.
    pub cue_before: String,
    /// Text below the answer.
    pub cue_after: String,
    /// Button label for `good`, e.g. `1d → 2d`.
    pub good_label: String,
    answer: String,
}

/// A quiz over one paragraph at a time.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    state: QuizState,
    card: Option<QuizCard>,
    sense: PromptSense,
    input: Option<InputMode>,
    transcript: String,
    mistakes_fixed: bool,
}

impl QuizSession {
    /// An idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> QuizState {
        self.state
    }

    /// The paragraph being quizzed, if any.
    #[must_use]
    pub fn card(&self) -> Option<&QuizCard> {
        self.card.as_ref()
    }

    /// Chosen prompt sense.
    #[must_use]
    pub fn sense(&self) -> PromptSense {
        self.sense
    }

    /// Chosen input mode, once input has begun.
    #[must_use]
    pub fn input(&self) -> Option<InputMode> {
        self.input
    }

    /// What the user has recited so far.
    #[must_use]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Whether the user said they fixed their mistakes while comparing.
    #[must_use]
    pub fn mistakes_fixed(&self) -> bool {
        self.mistakes_fixed
    }

    /// The paragraph text, only once it has been revealed.
    #[must_use]
    pub fn revealed_answer(&self) -> Option<&str> {
        match self.state {
            QuizState::Comparing | QuizState::Feedback => {
                self.card.as_ref().map(|c| c.answer.trim_end())
            }
            _ => None,
        }
    }

    /// Whether the transcript matches the answer, ignoring surrounding
    /// whitespace. `None` until the answer is revealed.
    #[must_use]
    pub fn transcript_matches(&self) -> Option<bool> {
        self.revealed_answer()
            .map(|answer| answer.trim() == self.transcript.trim())
    }

    fn require_state(&self, expected: QuizState, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(VersedError::InvalidTransition {
                state: self.state.name(),
                action,
            })
        }
    }

    /// Begin quizzing `paragraph` of `passage`: resolve its cues and mark
    /// the passage as seen.
    ///
    /// # Errors
    /// `InvalidTransition` unless idle; `PassageNotFound` or
    /// `ParagraphNotFound` for unknown ids; backend errors.
    pub fn start<R: Repository + ?Sized>(
        &mut self,
        repo: &mut R,
        scheduler: &Scheduler,
        passage: PassageId,
        paragraph: ParagraphId,
    ) -> Result<()> {
        self.require_state(QuizState::Idle, "start")?;

        let stored = store::require(repo, passage)?;
        let cues = cue::cues(&stored, paragraph)?;
        let target = stored
            .paragraph(paragraph)
            .ok_or(VersedError::ParagraphNotFound { passage, paragraph })?;
        let card = QuizCard {
            passage,
            paragraph,
            reference: stored.reference.clone(),
            cue_before: cues.before.to_string(),
            cue_after: cues.after.to_string(),
            good_label: scheduler.preview_label(target),
            answer: target.text.clone(),
        };

        if store::mark_seen(repo, passage)? {
            store::save_or_log(repo, "mark passage seen");
        }

        debug!(%passage, %paragraph, "Quiz started");
        *self = Self {
            state: QuizState::Prompting,
            card: Some(card),
            ..Self::default()
        };
        Ok(())
    }

    /// Pick how the cues are presented.
    ///
    /// # Errors
    /// `InvalidTransition` unless prompting.
    pub fn choose_sense(&mut self, sense: PromptSense) -> Result<()> {
        self.require_state(QuizState::Prompting, "choose_sense")?;
        self.sense = sense;
        Ok(())
    }

    /// Start reciting.
    ///
    /// # Errors
    /// `InvalidTransition` unless prompting.
    pub fn begin_input(&mut self, mode: InputMode) -> Result<()> {
        self.require_state(QuizState::Prompting, "begin_input")?;
        self.input = Some(mode);
        self.state = QuizState::Transcribing;
        Ok(())
    }

    /// Replace the transcript with the latest recited or typed text.
    ///
    /// # Errors
    /// `InvalidTransition` unless transcribing.
    pub fn edit(&mut self, text: impl Into<String>) -> Result<()> {
        self.require_state(QuizState::Transcribing, "edit")?;
        self.transcript = text.into();
        Ok(())
    }

    /// Stop reciting and reveal the answer.
    ///
    /// # Errors
    /// `InvalidTransition` unless transcribing.
    pub fn compare(&mut self) -> Result<()> {
        self.require_state(QuizState::Transcribing, "compare")?;
        self.state = QuizState::Comparing;
        Ok(())
    }

    /// Done comparing; ask for feedback.
    ///
    /// # Errors
    /// `InvalidTransition` unless comparing.
    pub fn finish_comparing(&mut self, mistakes_fixed: bool) -> Result<()> {
        self.require_state(QuizState::Comparing, "finish_comparing")?;
        self.mistakes_fixed = mistakes_fixed;
        self.state = QuizState::Feedback;
        Ok(())
    }

    /// Apply the user's grade, save, and return to idle.
    ///
    /// A failed save is logged and the session still ends. Any other error
    /// leaves the session in `Feedback`.
    ///
    /// # Errors
    /// `InvalidTransition` unless awaiting feedback; lookup or backend
    /// errors from recording the grade.
    pub fn grade<R: Repository + ?Sized>(
        &mut self,
        feedback: QuizFeedback,
        repo: &mut R,
        scheduler: &Scheduler,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome> {
        self.require_state(QuizState::Feedback, "grade")?;
        let Some(card) = self.card.as_ref() else {
            return Err(VersedError::InvalidTransition {
                state: self.state.name(),
                action: "grade",
            });
        };

        let outcome =
            store::record_feedback(repo, scheduler, card.passage, card.paragraph, feedback, now)?;
        let saved = store::save_or_log(repo, "quiz feedback");

        info!(
            passage = %card.passage,
            paragraph = %card.paragraph,
            %feedback,
            mistakes_fixed = self.mistakes_fixed,
            due = %outcome.due_date,
            saved,
            "Paragraph graded"
        );
        *self = Self::default();
        Ok(outcome)
    }

    /// Abandon the current paragraph without grading it.
    ///
    /// # Errors
    /// `InvalidTransition` when already idle.
    pub fn cancel(&mut self) -> Result<()> {
        if self.state == QuizState::Idle {
            return Err(VersedError::InvalidTransition {
                state: self.state.name(),
                action: "cancel",
            });
        }
        *self = Self::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use versed_core::model::{Passage, PassageDraft};
    use versed_core::store::MemoryStore;

    fn setup() -> (MemoryStore, Passage) {
        let mut repo = MemoryStore::new();
        let passage = Passage::new(
            0,
            PassageDraft {
                before: "In the beginning".to_string(),
                goal: "one\ntwo\nthree".to_string(),
                after: "The end".to_string(),
                reference: "Test 1:1".to_string(),
            },
            Utc::now() - Duration::hours(1),
        );
        repo.insert(passage.clone()).expect("insert");
        repo.save().expect("save");
        (repo, passage)
    }

    fn to_feedback(session: &mut QuizSession, repo: &mut MemoryStore, passage: &Passage, i: usize) {
        let scheduler = Scheduler::default();
        session
            .start(repo, &scheduler, passage.id, passage.paragraphs[i].id)
            .expect("start");
        session.choose_sense(PromptSense::Hear).expect("sense");
        session.begin_input(InputMode::Type).expect("input");
        session.edit("two").expect("edit");
        session.compare().expect("compare");
        session.finish_comparing(true).expect("finish");
    }

    #[test]
    fn full_cycle_good() {
        let (mut repo, passage) = setup();
        let scheduler = Scheduler::default();
        let mut session = QuizSession::new();

        to_feedback(&mut session, &mut repo, &passage, 1);
        let card = session.card().expect("card");
        assert_eq!(card.cue_before, "one\n");
        assert_eq!(card.cue_after, "three");
        assert_eq!(card.good_label, "now → 1d");
        assert_eq!(session.sense(), PromptSense::Hear);
        assert_eq!(session.input(), Some(InputMode::Type));
        assert_eq!(session.revealed_answer(), Some("two"));
        assert_eq!(session.transcript_matches(), Some(true));
        assert!(session.mistakes_fixed());

        let outcome = session
            .grade(QuizFeedback::Good, &mut repo, &scheduler, Utc::now())
            .expect("grade");
        assert!(outcome.due_date > outcome.previous_due);
        assert_eq!(session.state(), QuizState::Idle);
        assert!(session.card().is_none());
        assert!(!repo.has_changes());

        let stored = repo.get(passage.id).expect("get").expect("Some");
        assert_eq!(stored.paragraphs[1].review_count, 1);
        assert!(!stored.is_new);
    }

    #[test]
    fn start_marks_passage_seen() {
        let (mut repo, passage) = setup();
        let mut session = QuizSession::new();
        session
            .start(&mut repo, &Scheduler::default(), passage.id, passage.paragraphs[0].id)
            .expect("start");
        assert_eq!(session.card().expect("card").cue_before, "In the beginning");
        assert!(!repo.get(passage.id).expect("get").expect("Some").is_new);
        assert!(!repo.has_changes());
    }

    #[test]
    fn answer_hidden_until_compare() {
        let (mut repo, passage) = setup();
        let mut session = QuizSession::new();
        session
            .start(&mut repo, &Scheduler::default(), passage.id, passage.paragraphs[2].id)
            .expect("start");
        assert!(session.revealed_answer().is_none());
        session.begin_input(InputMode::Speak).expect("input");
        session.edit("thee").expect("edit");
        assert!(session.revealed_answer().is_none());
        session.compare().expect("compare");
        assert_eq!(session.revealed_answer(), Some("three"));
        assert_eq!(session.transcript_matches(), Some(false));
    }

    #[test]
    fn out_of_order_actions_are_rejected_without_changing_state() {
        let (mut repo, passage) = setup();
        let scheduler = Scheduler::default();
        let mut session = QuizSession::new();

        // Idle
        assert!(session.compare().is_err());
        assert!(session.cancel().is_err());
        assert!(
            session
                .grade(QuizFeedback::Good, &mut repo, &scheduler, Utc::now())
                .is_err()
        );
        assert_eq!(session.state(), QuizState::Idle);

        // Prompting
        session
            .start(&mut repo, &scheduler, passage.id, passage.paragraphs[0].id)
            .expect("start");
        let err = session.finish_comparing(false).expect_err("not comparing");
        assert!(matches!(
            err,
            VersedError::InvalidTransition { state: "prompting", action: "finish_comparing" }
        ));
        assert!(session.edit("x").is_err());
        assert!(
            session
                .start(&mut repo, &scheduler, passage.id, passage.paragraphs[1].id)
                .is_err()
        );
        assert_eq!(session.state(), QuizState::Prompting);
        assert_eq!(session.card().expect("card").paragraph, passage.paragraphs[0].id);

        // Transcribing: feedback cannot be skipped to.
        session.begin_input(InputMode::Type).expect("input");
        session.edit("partial").expect("edit");
        assert!(
            session
                .grade(QuizFeedback::Retry, &mut repo, &scheduler, Utc::now())
                .is_err()
        );
        assert!(session.choose_sense(PromptSense::Read).is_err());
        assert_eq!(session.state(), QuizState::Transcribing);
        assert_eq!(session.transcript(), "partial");

        // Comparing
        session.compare().expect("compare");
        assert!(session.begin_input(InputMode::Speak).is_err());
        assert_eq!(session.state(), QuizState::Comparing);

        // Feedback
        session.finish_comparing(false).expect("finish");
        assert!(session.compare().is_err());
        assert_eq!(session.state(), QuizState::Feedback);

        // Nothing was graded.
        let stored = repo.get(passage.id).expect("get").expect("Some");
        assert!(stored.paragraphs.iter().all(|p| p.review_count == 0));
    }

    #[test]
    fn cancel_from_any_active_state() {
        let (mut repo, passage) = setup();
        let scheduler = Scheduler::default();
        let id = passage.paragraphs[0].id;

        let steps: [fn(&mut QuizSession); 4] = [
            |_| {},
            |s| s.begin_input(InputMode::Type).expect("input"),
            |s| {
                s.begin_input(InputMode::Type).expect("input");
                s.compare().expect("compare");
            },
            |s| {
                s.begin_input(InputMode::Type).expect("input");
                s.compare().expect("compare");
                s.finish_comparing(false).expect("finish");
            },
        ];
        for step in steps {
            let mut session = QuizSession::new();
            session.start(&mut repo, &scheduler, passage.id, id).expect("start");
            step(&mut session);
            session.cancel().expect("cancel");
            assert_eq!(session.state(), QuizState::Idle);
            assert!(session.card().is_none());
        }
    }

    #[test]
    fn retry_makes_paragraph_due_again() {
        let (mut repo, passage) = setup();
        let scheduler = Scheduler::default();
        let mut session = QuizSession::new();
        to_feedback(&mut session, &mut repo, &passage, 0);

        let now = Utc::now();
        let outcome = session
            .grade(QuizFeedback::Retry, &mut repo, &scheduler, now)
            .expect("grade");
        assert!(outcome.due_date <= outcome.previous_due);
        let stored = repo.get(passage.id).expect("get").expect("Some");
        assert!(stored.paragraphs[0].is_due(now));
        assert_eq!(stored.paragraphs[0].lapse_count, 1);
    }

    #[test]
    fn grading_a_deleted_passage_keeps_feedback_state() {
        let (mut repo, passage) = setup();
        let scheduler = Scheduler::default();
        let mut session = QuizSession::new();
        to_feedback(&mut session, &mut repo, &passage, 0);

        repo.delete(passage.id).expect("delete");
        let err = session
            .grade(QuizFeedback::Good, &mut repo, &scheduler, Utc::now())
            .expect_err("gone");
        assert!(matches!(err, VersedError::PassageNotFound(_)));
        assert_eq!(session.state(), QuizState::Feedback);
    }

    #[test]
    fn start_with_unknown_paragraph_stays_idle() {
        let (mut repo, passage) = setup();
        let mut session = QuizSession::new();
        let stranger = ParagraphId::new();
        let err = session
            .start(&mut repo, &Scheduler::default(), passage.id, stranger)
            .expect_err("unknown");
        assert!(matches!(err, VersedError::ParagraphNotFound { .. }));
        assert_eq!(session.state(), QuizState::Idle);
        assert!(repo.get(passage.id).expect("get").expect("Some").is_new);
    }
}
