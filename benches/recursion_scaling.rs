//! Recursion scaling benchmark.
//!
//! Measures one `loss` and one `loss_and_grad` call of `HawkesSumExpCustom2`
//! as the number of events per realization grows, and the aggregate
//! evaluation for several worker counts on a fixed multi-realization set.
//! Time per event should stay flat across sizes.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ndarray::{Array1, array};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_hawkes::hawkes::prelude::*;
use std::hint::black_box;

const DIM: usize = 3;
const MAX_N: usize = 4;

fn make_data(
    seed: u64, n_real: usize, per_node: usize,
) -> (Vec<Vec<Array1<f64>>>, Vec<Array1<usize>>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let horizon = per_node as f64;
    let mut events = Vec::with_capacity(n_real);
    let mut states = Vec::with_capacity(n_real);
    for _ in 0..n_real {
        let per_real: Vec<Array1<f64>> = (0..DIM)
            .map(|_| {
                let mut ts: Vec<f64> = (0..per_node).map(|_| rng.gen_range(0.0..horizon)).collect();
                ts.sort_by(f64::total_cmp);
                ts.dedup();
                Array1::from(ts)
            })
            .collect();
        let total: usize = per_real.iter().map(|ts| ts.len()).sum();
        states.push(Array1::from_iter((0..=total).map(|_| rng.gen_range(0..MAX_N))));
        events.push(per_real);
    }
    (events, states, Array1::from_elem(n_real, horizon))
}

fn build_model(n_threads: usize, n_real: usize, per_node: usize) -> HawkesSumExpCustom2 {
    let options = EngineOptions::with_threads(n_threads).expect("valid thread count");
    let mut model =
        HawkesSumExpCustom2::new(DIM, array![0.5, 2.0, 8.0], MAX_N, options).expect("valid model");
    let (events, states, end_times) = make_data(7, n_real, per_node);
    model.set_data(events, states, Some(end_times)).expect("valid data");
    model
}

fn coeffs_for(model: &HawkesSumExpCustom2) -> Array1<f64> {
    Array1::from_iter((0..model.n_coeffs()).map(|k| 0.05 + 0.01 * (k % 7) as f64))
}

fn bench_event_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("custom2_event_scaling");
    for &per_node in &[1_000usize, 4_000, 16_000] {
        let model = build_model(1, 1, per_node);
        let coeffs = coeffs_for(&model);
        let mut grad = Array1::<f64>::zeros(model.n_coeffs());
        group.throughput(Throughput::Elements(model.n_total_jumps() as u64));

        group.bench_with_input(BenchmarkId::new("loss", per_node), &per_node, |b, _| {
            b.iter(|| black_box(model.loss(black_box(coeffs.view())).expect("loss")))
        });
        group.bench_with_input(BenchmarkId::new("loss_and_grad", per_node), &per_node, |b, _| {
            b.iter(|| {
                black_box(model.loss_and_grad(black_box(coeffs.view()), grad.view_mut()).expect("grad"))
            })
        });
    }
    group.finish();
}

fn bench_worker_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("custom2_worker_counts");
    for &n_threads in &[1usize, 2, 4] {
        let model = build_model(n_threads, 32, 500);
        let coeffs = coeffs_for(&model);
        let mut grad = Array1::<f64>::zeros(model.n_coeffs());
        group.bench_with_input(BenchmarkId::from_parameter(n_threads), &n_threads, |b, _| {
            b.iter(|| {
                black_box(model.loss_and_grad(black_box(coeffs.view()), grad.view_mut()).expect("grad"))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_event_scaling, bench_worker_counts);
criterion_main!(benches);
