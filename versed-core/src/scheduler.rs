//! Spaced-repetition feedback update.
//!
//! Each `good` grows a paragraph's interval multiplicatively:
//!
//! ```text
//!   next = min(max(initial, interval × growth), max_interval)
//!   due  = max(now, previous_due) + next
//! ```
//!
//! With the defaults (1 day initial, ×2 growth) a fresh paragraph goes
//! 0 → 1 d → 2 d → 4 d → … A `retry` resets the interval to zero and makes
//! the paragraph due again after `retry_delay`, never later than it already
//! was:
//!
//! ```text
//!   due = min(previous_due, now + retry_delay)
//! ```

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::SchedulingConfig;
use crate::model::Paragraph;
use crate::types::QuizFeedback;

/// Summary of one feedback update, for logging and UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    /// The feedback that was applied.
    pub feedback: QuizFeedback,
    /// Due date before the update.
    pub previous_due: DateTime<Utc>,
    /// Due date after the update.
    pub due_date: DateTime<Utc>,
    /// Interval before the update.
    pub previous_interval: Duration,
    /// Interval after the update.
    pub interval: Duration,
}

/// Applies quiz feedback to paragraphs.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulingConfig,
}

impl Scheduler {
    /// Create a scheduler with the given interval settings.
    #[must_use]
    pub fn new(config: SchedulingConfig) -> Self {
        Self { config }
    }

    /// The interval settings in use.
    #[must_use]
    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Interval a `good` would give a paragraph whose current interval is
    /// `current`.
    #[must_use]
    pub fn next_interval(&self, current: Duration) -> Duration {
        let initial = self.config.initial_interval();
        let max = self.config.max_interval();
        let grown = scale(current, self.config.growth_factor);
        grown.max(initial).min(max)
    }

    /// Record `feedback` for `paragraph` at time `now`.
    pub fn update(
        &self,
        paragraph: &mut Paragraph,
        feedback: QuizFeedback,
        now: DateTime<Utc>,
    ) -> ReviewOutcome {
        let previous_due = paragraph.due_date;
        let previous_interval = paragraph.interval();

        let (interval, due_date) = match feedback {
            QuizFeedback::Good => {
                let next = self.next_interval(previous_interval);
                (next, add_clamped(previous_due.max(now), next))
            }
            QuizFeedback::Retry => {
                paragraph.lapse_count += 1;
                let retry_at = add_clamped(now, self.config.retry_delay());
                (Duration::zero(), previous_due.min(retry_at))
            }
        };

        paragraph.interval_secs = interval.num_seconds();
        paragraph.due_date = due_date;
        paragraph.review_count += 1;
        paragraph.last_reviewed = Some(now);

        debug!(
            paragraph = %paragraph.id,
            %feedback,
            interval_secs = paragraph.interval_secs,
            due = %due_date,
            "Recorded quiz feedback"
        );

        ReviewOutcome {
            feedback,
            previous_due,
            due_date,
            previous_interval,
            interval,
        }
    }

    /// [`update`](Self::update) at the current wall-clock time.
    pub fn update_now(&self, paragraph: &mut Paragraph, feedback: QuizFeedback) -> ReviewOutcome {
        self.update(paragraph, feedback, Utc::now())
    }

    /// Current interval and the interval a `good` would give, for labels
    /// such as "1d → 2d".
    #[must_use]
    pub fn preview(&self, paragraph: &Paragraph) -> (Duration, Duration) {
        let current = paragraph.interval();
        (current, self.next_interval(current))
    }

    /// [`preview`](Self::preview) rendered with [`format_interval`].
    #[must_use]
    pub fn preview_label(&self, paragraph: &Paragraph) -> String {
        let (current, next) = self.preview(paragraph);
        format!("{} → {}", format_interval(current), format_interval(next))
    }
}

/// `t + d`, pinned to the last representable instant instead of overflowing.
fn add_clamped(t: DateTime<Utc>, d: Duration) -> DateTime<Utc> {
    t.checked_add_signed(d).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn scale(d: Duration, factor: f64) -> Duration {
    let secs = (d.num_seconds() as f64 * factor).round();
    if secs >= Duration::MAX.num_seconds() as f64 {
        Duration::MAX
    } else {
        Duration::seconds(secs as i64)
    }
}

/// Format an interval as a compact human-readable label.
#[must_use]
pub fn format_interval(interval: Duration) -> String {
    let hours = interval.num_hours();
    let days = interval.num_days();
    if hours < 1 {
        "now".to_string()
    } else if days < 1 {
        format!("{hours}h")
    } else if days < 7 {
        format!("{days}d")
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
