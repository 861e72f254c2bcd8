// Criterion benchmarks for Spark Vote

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use spark_vote::core::{candidates_for, find_all_matched_pairs, plan_repairs, rank, VoteLedger};
use spark_vote::models::{Gender, Participant, Role};

/// An event of `count` participants, half of each gender
///
/// Each participant votes for three members of the other group; every
/// third vote is returned, and only half of those matches were recorded.
fn create_event(count: usize) -> Vec<Participant> {
    let half = count / 2;
    (0..count)
        .map(|i| {
            let gender = if i < half { Gender::Male } else { Gender::Female };
            let mut p = Participant::new(format!("p{}", i), gender, Role::User);
            p.profile.name = Some(format!("Participant {}", i));

            let offset = if i < half { half } else { 0 };
            let local = i % half.max(1);
            p.votes_given = (0..3)
                .map(|k| format!("p{}", offset + (local + k) % half.max(1)))
                .collect();
            if local % 3 == 0 && i < half {
                p.matches = vec![format!("p{}", offset + local)];
            }
            p
        })
        .collect()
}

fn bench_vote_validation(c: &mut Criterion) {
    let ledger = VoteLedger::default();
    let current = vec!["p10".to_string(), "p11".to_string()];

    c.bench_function("vote_validation", |b| {
        b.iter(|| ledger.validate(black_box("p1"), black_box("p12"), black_box(&current)));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");

    for participant_count in [20, 100, 500, 1000].iter() {
        let participants = create_event(*participant_count);

        group.bench_with_input(
            BenchmarkId::new("rank", participant_count),
            participant_count,
            |b, _| {
                b.iter(|| rank(black_box(&participants), black_box(Gender::Female)));
            },
        );
    }

    group.finish();
}

fn bench_matched_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("matched_pairs");

    for participant_count in [20, 100, 500, 1000].iter() {
        let participants = create_event(*participant_count);

        group.bench_with_input(
            BenchmarkId::new("find_all_matched_pairs", participant_count),
            participant_count,
            |b, _| {
                b.iter(|| find_all_matched_pairs(black_box(&participants)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("plan_repairs", participant_count),
            participant_count,
            |b, _| {
                b.iter(|| plan_repairs(black_box(&participants)));
            },
        );
    }

    group.finish();
}

fn bench_candidate_list(c: &mut Criterion) {
    let participants = create_event(100);

    c.bench_function("candidates_for_100_participants", |b| {
        b.iter(|| black_box(candidates_for(&participants[0], &participants)));
    });
}

criterion_group!(
    benches,
    bench_vote_validation,
    bench_ranking,
    bench_matched_pairs,
    bench_candidate_list
);

criterion_main!(benches);
