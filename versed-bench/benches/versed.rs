//! Versed Benchmark Suite
//!
//! Hot paths a shell hits on every screen refresh or grade:
//!   due_queue_500_passages ....... ordering the quiz queue
//!   scheduler_update ............. one feedback update
//!   memory_store_user_query ...... listing user texts
//!   add_form_submit .............. one submission incl. index assignment

use chrono::{DateTime, Duration, Utc};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use versed_app::{AddForm, FormField};
use versed_core::due;
use versed_core::model::{Passage, PassageDraft};
use versed_core::scheduler::Scheduler;
use versed_core::store::{MemoryStore, PassageQuery, Repository};
use versed_core::types::QuizFeedback;

fn make_passage(i: i64, now: DateTime<Utc>) -> Passage {
    let goal = (0..4)
        .map(|line| format!("Verse {i} line {line} of the passage"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut passage = Passage::new(i, PassageDraft::goal(goal), now - Duration::days(30));
    for (k, para) in (0i64..).zip(passage.paragraphs.iter_mut()) {
        para.due_date = now + Duration::hours((i * 7 + k * 13) % 96 - 48);
    }
    passage
}

fn library(n: i64, now: DateTime<Utc>) -> Vec<Passage> {
    (0..n).map(|i| make_passage(i, now)).collect()
}

/// Benchmark: order the due queue over 500 passages (2000 paragraphs).
fn bench_due_queue(c: &mut Criterion) {
    let now = Utc::now();
    let passages = library(500, now);
    c.bench_function("due_queue_500_passages", |b| {
        b.iter(|| {
            let queue = due::due_paragraphs(black_box(&passages), now);
            black_box(queue.len());
        });
    });
    c.bench_function("due_count_500_passages", |b| {
        b.iter(|| black_box(due::count_due(black_box(&passages), now)));
    });
}

/// Benchmark: a single `good` update.
fn bench_scheduler_update(c: &mut Criterion) {
    let scheduler = Scheduler::default();
    let now = Utc::now();
    let passage = make_passage(0, now);
    c.bench_function("scheduler_update", |b| {
        b.iter_batched(
            || passage.paragraphs[0].clone(),
            |mut para| black_box(scheduler.update(&mut para, QuizFeedback::Good, now)),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: user-text query against an in-memory store of 200 passages.
fn bench_store_query(c: &mut Criterion) {
    let now = Utc::now();
    let mut repo = MemoryStore::new();
    for passage in library(200, now) {
        let _ = repo.insert(passage);
    }
    let _ = repo.save();

    c.bench_function("memory_store_user_query", |b| {
        b.iter(|| black_box(repo.query(&PassageQuery::user()).map(|v| v.len())));
    });
}

/// Benchmark: submit the add form into a store of 200 passages.
fn bench_form_submit(c: &mut Criterion) {
    let now = Utc::now();
    let mut base = MemoryStore::new();
    for passage in library(200, now) {
        let _ = base.insert(passage);
    }
    let _ = base.save();

    c.bench_function("add_form_submit", |b| {
        b.iter_batched(
            || base.clone(),
            |mut repo| {
                let mut form = AddForm::new();
                form.set(FormField::Goal, "The LORD is my shepherd;\nI shall not want.");
                form.set(FormField::Reference, "Psalm 23:1");
                black_box(form.submit(&mut repo, now).is_ok())
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_due_queue,
    bench_scheduler_update,
    bench_store_query,
    bench_form_submit,
);
criterion_main!(benches);
