use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use footy_model::action_value::{Action, MistakeType, compute_cav};
use footy_model::match_metrics::aggregate;
use footy_model::match_rating::{MatchRatingInputs, Modifiers, compute_mpr};
use footy_model::pipeline::RatingPipeline;
use footy_model::role_weights::RoleWeightTable;
use footy_model::season_rating::{CsrMode, compute_csr};
use footy_model::sheet::MatchSheet;
use footy_model::store::MemoryStore;

fn sample_actions(n: usize) -> Vec<Action> {
    let mistakes = [
        MistakeType::None,
        MistakeType::None,
        MistakeType::Execution,
        MistakeType::None,
        MistakeType::Forced,
        MistakeType::Decision,
    ];
    (0..n)
        .map(|idx| {
            let base = 3.0 + (idx % 7) as f64;
            Action::new(
                base,
                base + 0.5,
                (base - 1.0).max(1.0),
                base,
                10.0 - base,
                mistakes[idx % mistakes.len()],
            )
            .with_phase("Build-up")
        })
        .collect()
}

fn bench_cav(c: &mut Criterion) {
    let actions = sample_actions(64);
    c.bench_function("cav_64_actions", |b| {
        b.iter(|| {
            let total: f64 = black_box(&actions).iter().map(compute_cav).sum();
            black_box(total);
        })
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let actions = sample_actions(120);
    c.bench_function("aggregate_120_actions", |b| {
        b.iter(|| {
            let m = aggregate(black_box(&actions));
            black_box(m.aqc);
        })
    });
}

fn bench_mpr(c: &mut Criterion) {
    let metrics = aggregate(&sample_actions(40));
    let inputs = MatchRatingInputs::from_metrics(&metrics, 60.0, 25.0);
    let weights = RoleWeightTable::standard()
        .weights_for("AM / 10")
        .expect("standard role");
    let modifiers = Modifiers::new(1.03, 1.15, Some(1.05));
    c.bench_function("mpr_compute", |b| {
        b.iter(|| black_box(compute_mpr(black_box(&inputs), &weights, &modifiers)))
    });
}

fn bench_csr(c: &mut Criterion) {
    let mprs: Vec<f64> = (0..38).map(|idx| 50.0 + ((idx * 17) % 45) as f64).collect();
    c.bench_function("csr_38_matches", |b| {
        b.iter(|| black_box(compute_csr(black_box(&mprs), 65.0, CsrMode::Weighted)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let sheet = MatchSheet::from_json_str(SHEET_JSON).expect("valid fixture json");
    let pipeline = RatingPipeline::new(RoleWeightTable::standard().clone(), MemoryStore::new());
    c.bench_function("pipeline_rate_match", |b| {
        b.iter(|| {
            let report = pipeline.rate_match(black_box(&sheet)).unwrap();
            black_box(report.mpr);
        })
    });
}

criterion_group!(perf, bench_cav, bench_aggregate, bench_mpr, bench_csr, bench_pipeline);
criterion_main!(perf);

static SHEET_JSON: &str = include_str!("../tests/fixtures/match_sheet.json");
