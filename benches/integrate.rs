//! Benchmarks for per-tick integration cost.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use attractors::dynamics::{Dynamics, MapContext};
use attractors::integrator::{euler, rk4};
use attractors::{Simulation, SimulationConfig, SystemKind};

fn bench_single_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_step");
    let s = Vec3::new(1.0, -0.5, 0.25);

    group.bench_function("thomas_euler", |b| {
        let thomas = SystemKind::Thomas.definition().dynamics;
        b.iter(|| black_box(euler(&thomas, black_box(s), 0.01)))
    });

    group.bench_function("rossler_rk4", |b| {
        let rossler = SystemKind::Rossler.definition().dynamics;
        b.iter(|| black_box(rk4(&rossler, black_box(s), 0.01)))
    });

    group.bench_function("ikeda_map", |b| {
        let ikeda = Dynamics::Ikeda { a: 1.0, b: 0.9, k: 0.4, p: 6.0 };
        let ctx = MapContext { phase: 0.3, age: 100 };
        b.iter(|| black_box(ikeda.map(black_box(s), ctx)))
    });

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for kind in [SystemKind::Thomas, SystemKind::Rossler, SystemKind::Ikeda, SystemKind::Lozi] {
        let config = SimulationConfig::new(kind.name())
            .with_total_count(10_000)
            .with_seed(1);
        let mut sim = match Simulation::from_config(&config) {
            Ok(sim) => sim,
            Err(e) => panic!("{}: {}", kind, e),
        };
        // keep the controller from resizing mid-benchmark
        let budget = sim.controller().config().target_frame_time();
        sim.set_fixed_cost(Some(budget));

        group.bench_with_input(BenchmarkId::new("system", kind), &kind, |b, _| {
            b.iter(|| black_box(sim.tick()))
        });
    }

    group.finish();
}

fn bench_particle_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("lozi_particles");

    for count in [1_000usize, 5_000, 15_000] {
        let config = SimulationConfig::new("lozi").with_total_count(count).with_seed(2);
        let mut sim = match Simulation::from_config(&config) {
            Ok(sim) => sim,
            Err(e) => panic!("lozi: {}", e),
        };
        let budget = sim.controller().config().target_frame_time();
        sim.set_fixed_cost(Some(budget));

        group.bench_with_input(BenchmarkId::new("count", count), &count, |b, _| {
            b.iter(|| black_box(sim.tick()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_step,
    bench_tick,
    bench_particle_count
);
criterion_main!(benches);
