//! The application facade a shell drives.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use versed_core::config::VersedConfig;
use versed_core::error::Result;
use versed_core::model::Passage;
use versed_core::scheduler::{ReviewOutcome, Scheduler};
use versed_core::seed;
use versed_core::store::{Repository, SqliteStore};
use versed_core::types::{ParagraphId, PassageId, QuizFeedback};

use crate::add_form::AddForm;
use crate::dashboard;
use crate::quiz::QuizSession;

/// Repository, configuration and UI state for one running app.
#[derive(Debug)]
pub struct VersedApp<R: Repository> {
    repo: R,
    config: VersedConfig,
    scheduler: Scheduler,
    form: AddForm,
    quiz: QuizSession,
}

impl VersedApp<SqliteStore> {
    /// Open (or create) the library at `path` and launch on it.
    ///
    /// Before launching, the database is integrity-checked and a rotating
    /// backup is taken (`persistence.backup_count` copies). Failures of
    /// either are logged and the app still opens.
    ///
    /// # Errors
    /// Database errors, or an invalid config.
    pub fn open(path: &Path, config: VersedConfig) -> Result<Self> {
        config.validate()?;
        let repo = SqliteStore::open(path, &config.persistence)?;

        match repo.integrity_check() {
            Ok(true) => {}
            Ok(false) => warn!(path = %path.display(), "Integrity check reported corruption"),
            Err(e) => warn!(error = %e, "Integrity check failed to run"),
        }
        if let Err(e) = repo.create_rotating_backup() {
            warn!(error = %e, "Failed to create startup backup");
        }

        Self::launch(repo, config)
    }
}

impl<R: Repository> VersedApp<R> {
    /// Validate `config`, seed the example passages if enabled and not yet
    /// present, and return the app.
    ///
    /// # Errors
    /// An invalid config, or backend errors while seeding.
    pub fn launch(mut repo: R, config: VersedConfig) -> Result<Self> {
        config.validate()?;
        let seeded = if config.seed.examples_enabled {
            seed::ensure_examples(&mut repo, Utc::now())?
        } else {
            0
        };
        info!(seeded, "Versed launched");

        Ok(Self {
            repo,
            scheduler: Scheduler::new(config.scheduling.clone()),
            config,
            form: AddForm::new(),
            quiz: QuizSession::new(),
        })
    }

    /// The repository.
    #[must_use]
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// The repository, mutably.
    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &VersedConfig {
        &self.config
    }

    /// The scheduler built from the config.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Give back the repository.
    pub fn into_repo(self) -> R {
        self.repo
    }

    // -- Add form -----------------------------------------------------------

    /// The add-text form.
    #[must_use]
    pub fn form(&self) -> &AddForm {
        &self.form
    }

    /// The add-text form, for editing fields.
    pub fn form_mut(&mut self) -> &mut AddForm {
        &mut self.form
    }

    /// Submit the add-text form.
    ///
    /// # Errors
    /// See [`AddForm::submit`].
    pub fn submit_form(&mut self, now: DateTime<Utc>) -> Result<PassageId> {
        self.form.submit(&mut self.repo, now)
    }

    // -- Quiz ---------------------------------------------------------------

    /// The quiz session.
    #[must_use]
    pub fn quiz(&self) -> &QuizSession {
        &self.quiz
    }

    /// The quiz session, for transitions that do not touch storage.
    pub fn quiz_mut(&mut self) -> &mut QuizSession {
        &mut self.quiz
    }

    /// Start quizzing a chosen paragraph.
    ///
    /// # Errors
    /// See [`QuizSession::start`].
    pub fn start_quiz(&mut self, passage: PassageId, paragraph: ParagraphId) -> Result<()> {
        self.quiz
            .start(&mut self.repo, &self.scheduler, passage, paragraph)
    }

    /// Start quizzing the paragraph that has been due longest. Returns its
    /// ids, or `None` when nothing is due.
    ///
    /// # Errors
    /// See [`QuizSession::start`].
    pub fn start_next_quiz(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Option<(PassageId, ParagraphId)>> {
        let Some((passage, paragraph)) = dashboard::next_quiz(&self.repo, now)? else {
            return Ok(None);
        };
        self.start_quiz(passage, paragraph)?;
        Ok(Some((passage, paragraph)))
    }

    /// Grade the quizzed paragraph.
    ///
    /// # Errors
    /// See [`QuizSession::grade`].
    pub fn grade(&mut self, feedback: QuizFeedback, now: DateTime<Utc>) -> Result<ReviewOutcome> {
        self.quiz
            .grade(feedback, &mut self.repo, &self.scheduler, now)
    }

    // -- Dashboard ----------------------------------------------------------

    /// See [`dashboard::new_texts_badge`].
    ///
    /// # Errors
    /// Backend errors.
    pub fn new_texts_badge(&self) -> Result<Option<&'static str>> {
        dashboard::new_texts_badge(&self.repo)
    }

    /// See [`dashboard::paragraphs_due`].
    ///
    /// # Errors
    /// Backend errors.
    pub fn paragraphs_due(&self, now: DateTime<Utc>) -> Result<usize> {
        dashboard::paragraphs_due(&self.repo, now)
    }

    /// See [`dashboard::user_texts`].
    ///
    /// # Errors
    /// Backend errors.
    pub fn user_texts(&self) -> Result<Vec<Passage>> {
        dashboard::user_texts(&self.repo)
    }

    /// See [`dashboard::example_texts`].
    ///
    /// # Errors
    /// Backend errors.
    pub fn example_texts(&self) -> Result<Vec<Passage>> {
        dashboard::example_texts(&self.repo)
    }

    /// See [`dashboard::open_text`].
    ///
    /// # Errors
    /// `PassageNotFound`, or backend errors.
    pub fn open_text(&mut self, id: PassageId) -> Result<Passage> {
        dashboard::open_text(&mut self.repo, id)
    }

    /// Delete a passage, abandoning the quiz if it was on that passage.
    ///
    /// # Errors
    /// Backend errors.
    pub fn delete_text(&mut self, id: PassageId) -> Result<bool> {
        let removed = dashboard::delete_text(&mut self.repo, id)?;
        if removed && self.quiz.card().is_some_and(|c| c.passage == id) {
            self.quiz = QuizSession::new();
        }
        Ok(removed)
    }
}
