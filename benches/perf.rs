use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use matchday_alerts::config::PipelineConfig;
use matchday_alerts::features::assemble_all;
use matchday_alerts::history::{Fixture, HistoryIndex, HistoryRecord, parse_match_date};
use matchday_alerts::pipeline;
use matchday_alerts::rolling::rolling_means;
use matchday_alerts::stats::{StatLine, Statistic};

const TEAMS: usize = 40;
const MATCHES_PER_TEAM: usize = 38;

fn sample_history() -> Vec<HistoryRecord> {
    let mut rows = Vec::with_capacity(TEAMS * MATCHES_PER_TEAM);
    for t in 0..TEAMS {
        for m in 0..MATCHES_PER_TEAM {
            let k = (t * 13 + m * 7) % 17;
            rows.push(HistoryRecord {
                team: format!("Team {t}"),
                date: parse_match_date(&format!("2024-{:02}-{:02}", 1 + m / 28, 1 + m % 28))
                    .expect("valid date"),
                stats: StatLine {
                    goals: (k % 5) as f64,
                    shots: 5.0 + k as f64,
                    shots_on_target: (k % 8) as f64,
                    corners: 2.0 + (k % 9) as f64,
                },
            });
        }
    }
    rows
}

fn sample_fixtures() -> Vec<Fixture> {
    (0..TEAMS / 2)
        .map(|i| Fixture {
            home_team: format!("Team {}", 2 * i),
            away_team: format!("Team {}", 2 * i + 1),
            league: "Bench League".to_string(),
            date: "2024-03-01".to_string(),
            kickoff_time: "15".to_string(),
        })
        .collect()
}

fn bench_rolling_means(c: &mut Criterion) {
    let history = sample_history();
    c.bench_function("rolling_means_scan", |b| {
        b.iter(|| {
            let m = rolling_means(
                black_box(&history),
                "Team 7",
                Statistic::Shots,
                &[5, 10, 15],
            );
            black_box(m.vector());
        })
    });
}

fn bench_assemble(c: &mut Criterion) {
    let history = sample_history();
    let fixtures = sample_fixtures();
    c.bench_function("assemble_fixture_features", |b| {
        b.iter(|| {
            let index = HistoryIndex::build(black_box(&history));
            let recs = assemble_all(&fixtures, &index, &Statistic::ALL, &[5, 10, 15]);
            black_box(recs.len());
        })
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let history = sample_history();
    let fixtures = sample_fixtures();
    let cfg = PipelineConfig::default();
    c.bench_function("pipeline_run", |b| {
        b.iter(|| {
            let table = pipeline::run(black_box(&history), &fixtures, &cfg).unwrap();
            black_box(table.rows.len());
        })
    });
}

criterion_group!(benches, bench_rolling_means, bench_assemble, bench_pipeline);
criterion_main!(benches);
