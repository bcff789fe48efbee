//! Integration Tests: End-to-End Passage Flows
//!
//! These tests drive the core through its public API only: create
//! passages, quiz them, persist, reopen.

use chrono::{Duration, Utc};

use versed_core::config::PersistenceConfig;
use versed_core::cue;
use versed_core::due;
use versed_core::model::{Passage, PassageDraft};
use versed_core::scheduler::Scheduler;
use versed_core::seed::{self, EXAMPLES};
use versed_core::store::{self, MemoryStore, PassageQuery, Repository, SqliteStore};
use versed_core::types::QuizFeedback;

fn draft(reference: &str, goal: &str) -> PassageDraft {
    PassageDraft {
        before: format!("before {reference}"),
        goal: goal.to_string(),
        after: format!("after {reference}"),
        reference: reference.to_string(),
    }
}

fn create<R: Repository>(repo: &mut R, d: PassageDraft) -> Passage {
    let index = store::next_user_index(repo).expect("index");
    let passage = Passage::new(index, d, Utc::now());
    repo.insert(passage.clone()).expect("insert");
    repo.save().expect("save");
    passage
}

// ---------------------------------------------------------------------------
// Full lifecycle: seed → create → quiz → persist → reopen
// ---------------------------------------------------------------------------

#[test]
fn full_passage_lifecycle_on_sqlite() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("versed.db");
    let config = PersistenceConfig::default();
    let scheduler = Scheduler::default();
    let now = Utc::now();

    let (passage_id, first_paragraph) = {
        let mut repo = SqliteStore::open(&path, &config).expect("open");

        // 1. First launch seeds the examples; they do not affect user indexes.
        assert_eq!(seed::ensure_examples(&mut repo, now).expect("seed"), EXAMPLES.len());
        assert_eq!(store::next_user_index(&repo).expect("index"), 0);

        // 2. User adds two passages.
        let psalm = create(
            &mut repo,
            draft("Psalm 23:1", "The LORD is my shepherd;\nI shall not want."),
        );
        let john = create(&mut repo, draft("John 11:35", "Jesus wept."));
        assert_eq!((psalm.index, john.index), (0, 1));

        // 3. Both are due; the psalm's first paragraph comes first (lower index).
        let all = repo.query(&PassageQuery::all()).expect("query");
        assert_eq!(due::count_due(&all, now + Duration::seconds(1)), 3);
        let next = due::next_due(&all, now + Duration::seconds(1)).expect("due");
        assert_eq!(next.passage.id, psalm.id);
        assert_eq!(next.paragraph.position, 0);

        // 4. Cues around it.
        let cues = cue::cues(next.passage, next.paragraph.id).expect("cues");
        assert_eq!(cues.before, "before Psalm 23:1");
        assert_eq!(cues.after, "I shall not want.");

        // 5. Grade it good and persist.
        let (pid, para) = next.ids();
        let outcome =
            store::record_feedback(&mut repo, &scheduler, pid, para, QuizFeedback::Good, now)
                .expect("feedback");
        assert!(outcome.due_date > outcome.previous_due);
        assert!(store::mark_seen(&mut repo, pid).expect("seen"));
        repo.save().expect("save");
        (pid, para)
    };

    // 6. Reopen: state survived.
    let repo = SqliteStore::open(&path, &config).expect("reopen");
    let psalm = repo.get(passage_id).expect("get").expect("Some");
    let p0 = psalm.paragraph(first_paragraph).expect("paragraph");
    assert_eq!(p0.review_count, 1);
    assert_eq!(p0.interval(), Duration::days(1));
    assert!(!psalm.is_new);

    let all = repo.query(&PassageQuery::all()).expect("query");
    assert_eq!(due::count_due(&all, now + Duration::seconds(1)), 2);
    assert_eq!(repo.query(&PassageQuery::examples()).expect("examples").len(), EXAMPLES.len());
    assert_eq!(repo.query(&PassageQuery::new_user_texts()).expect("new").len(), 1);
}

// ---------------------------------------------------------------------------
// Index assignment
// ---------------------------------------------------------------------------

#[test]
fn indexes_continue_after_deletion_without_renumbering() {
    let mut repo = MemoryStore::new();
    let a = create(&mut repo, PassageDraft::goal("a"));
    let b = create(&mut repo, PassageDraft::goal("b"));
    let c = create(&mut repo, PassageDraft::goal("c"));
    assert_eq!([a.index, b.index, c.index], [0, 1, 2]);

    assert!(repo.delete(b.id).expect("delete"));
    let d = create(&mut repo, PassageDraft::goal("d"));
    assert_eq!(d.index, 3);

    let indexes: Vec<i64> = repo
        .query(&PassageQuery::user())
        .expect("query")
        .iter()
        .map(|p| p.index)
        .collect();
    assert_eq!(indexes, vec![0, 2, 3]);

    // Deleting the highest index frees it for reuse.
    assert!(repo.delete(d.id).expect("delete"));
    assert_eq!(store::next_user_index(&repo).expect("index"), 3);
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[test]
fn retry_keeps_paragraph_at_front_of_queue() {
    let mut repo = MemoryStore::new();
    let scheduler = Scheduler::default();
    let start = Utc::now() - Duration::hours(1);

    let passage = create(&mut repo, PassageDraft::goal("one\ntwo"));
    let first = passage.paragraphs[0].id;

    store::record_feedback(&mut repo, &scheduler, passage.id, first, QuizFeedback::Retry, start)
        .expect("retry");

    let all = repo.query(&PassageQuery::all()).expect("query");
    let next = due::next_due(&all, Utc::now()).expect("due");
    assert_eq!(next.paragraph.id, first);
    assert_eq!(next.paragraph.lapse_count, 1);
}

#[test]
fn feedback_on_unknown_ids_is_an_error() {
    let mut repo = MemoryStore::new();
    let scheduler = Scheduler::default();
    let passage = create(&mut repo, PassageDraft::goal("x"));
    let other = Passage::new(9, PassageDraft::goal("y"), Utc::now());

    assert!(
        store::record_feedback(
            &mut repo,
            &scheduler,
            other.id,
            other.paragraphs[0].id,
            QuizFeedback::Good,
            Utc::now()
        )
        .is_err()
    );
    assert!(
        store::record_feedback(
            &mut repo,
            &scheduler,
            passage.id,
            other.paragraphs[0].id,
            QuizFeedback::Good,
            Utc::now()
        )
        .is_err()
    );
}

// ---------------------------------------------------------------------------
// Seeding on both stores
// ---------------------------------------------------------------------------

#[test]
fn seeding_idempotent_on_sqlite() {
    let mut repo = SqliteStore::open_in_memory(&PersistenceConfig::default()).expect("open");
    let now = Utc::now();
    assert_eq!(seed::ensure_examples(&mut repo, now).expect("seed"), EXAMPLES.len());
    assert_eq!(seed::ensure_examples(&mut repo, now).expect("seed"), 0);

    let examples = repo.query(&PassageQuery::examples()).expect("query");
    assert_eq!(examples.len(), EXAMPLES.len());
    let refs: Vec<&str> = examples.iter().map(|p| p.reference.as_str()).collect();
    let expected: Vec<&str> = EXAMPLES.iter().map(|e| e.reference).collect();
    assert_eq!(refs, expected, "examples come back in seed order");

    // Examples never show up as user texts or count as due.
    assert!(repo.query(&PassageQuery::user()).expect("query").is_empty());
    assert_eq!(due::count_due(&examples, now + Duration::days(1)), 0);
}
