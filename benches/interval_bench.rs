//! Criterion benchmarks for the calendar interval and aggregation core

use chrono::{Duration, NaiveDate};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use traffictally::interval::{CalendarInterval, Granularity};
use traffictally::services::{EnvironmentObservations, ObservationAccumulator, TableAssembler};
use traffictally::types::Observation;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn year_interval() -> CalendarInterval {
    CalendarInterval::new(date(2023, 1, 1), date(2023, 12, 31), Granularity::Monthly).unwrap()
}

/// Deterministic observation spread: `entities` APIs reporting every
/// `step_days` across the year.
fn synthetic_observations(entities: usize, step_days: i64) -> Vec<Observation> {
    let mut observations = Vec::new();
    for e in 0..entities {
        let entity = format!("api-{:03}", e);
        let mut d = date(2023, 1, 1);
        while d <= date(2023, 12, 31) {
            observations.push(Observation::new(
                entity.clone(),
                d,
                (e as f64 + 1.0) * 100.0,
            ));
            d = d + Duration::days(step_days);
        }
    }
    observations
}

fn bench_column_index(c: &mut Criterion) {
    let interval = year_interval();
    let dates: Vec<NaiveDate> = (0..365).map(|i| date(2023, 1, 1) + Duration::days(i)).collect();

    let mut group = c.benchmark_group("interval");
    group.throughput(Throughput::Elements(dates.len() as u64));

    group.bench_function("column_index_year_of_dates", |b| {
        b.iter(|| {
            for d in &dates {
                black_box(interval.column_index(black_box(*d)));
            }
        });
    });

    group.finish();
}

fn bench_accumulate(c: &mut Criterion) {
    let interval = year_interval();

    let mut group = c.benchmark_group("accumulator");
    for entities in [10, 100] {
        let observations = synthetic_observations(entities, 7);
        group.throughput(Throughput::Elements(observations.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("fold", format!("{} entities", entities)),
            &observations,
            |b, observations| {
                b.iter(|| {
                    let mut acc = ObservationAccumulator::new(&interval);
                    acc.fold(black_box(observations));
                    black_box(acc.into_rows("acme", "prod"))
                });
            },
        );
    }

    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let interval = year_interval();
    let streams = vec![
        EnvironmentObservations {
            environment: "test".into(),
            observations: synthetic_observations(50, 7),
        },
        EnvironmentObservations {
            environment: "prod".into(),
            observations: synthetic_observations(50, 7),
        },
    ];

    let total: usize = streams.iter().map(|s| s.observations.len()).sum();

    let mut group = c.benchmark_group("assembler");
    group.throughput(Throughput::Elements(total as u64));

    group.bench_function("assemble_two_environments", |b| {
        b.iter(|| {
            let assembler = TableAssembler::new(&interval);
            black_box(assembler.assemble("acme", black_box(&streams)).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_column_index, bench_accumulate, bench_assemble);
criterion_main!(benches);
