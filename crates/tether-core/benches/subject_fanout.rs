//! Benchmarks for subject fan-out and the operator chain.
//!
//! Run with: cargo bench -p tether-core --bench subject_fanout

use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tether_core::{Subject, Subscription};

// =============================================================================
// Fan-out
// =============================================================================

fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("subject/on_next");

    for observers in [1_usize, 8, 64, 512] {
        group.throughput(Throughput::Elements(observers as u64));
        let subject = Subject::new();
        let sum = Rc::new(Cell::new(0_u64));
        let _subs: Vec<Subscription> = (0..observers)
            .map(|_| {
                let sum = Rc::clone(&sum);
                subject.as_observable().subscribe(move |v: u64| sum.set(sum.get().wrapping_add(v)))
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("fanout", observers), &subject, |b, s| {
            b.iter(|| s.on_next(black_box(1)));
        });
    }

    group.finish();
}

// =============================================================================
// Subscribe / dispose churn
// =============================================================================

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("subject/churn");
    let subject: Subject<u64> = Subject::new();

    group.bench_function("subscribe_dispose", |b| {
        b.iter(|| {
            let sub = subject.as_observable().subscribe(|v| {
                black_box(v);
            });
            sub.dispose();
        })
    });

    group.finish();
}

// =============================================================================
// Operator chain
// =============================================================================

fn bench_operator_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("observable/chain");
    let subject: Subject<u64> = Subject::new();
    let stop: Subject<()> = Subject::new();
    let chained = subject
        .as_observable()
        .map(|v| v * 2)
        .filter(|v| v % 3 != 0)
        .take_until(&stop.as_observable());
    let _sub = chained.subscribe(|v| {
        black_box(v);
    });

    group.bench_function("map_filter_take_until", |b| {
        b.iter(|| subject.on_next(black_box(7)));
    });

    group.finish();
}

criterion_group!(benches, bench_fanout, bench_churn, bench_operator_chain);
criterion_main!(benches);
