use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use fewbody::integrator::{accelerations, Integrator};
use fewbody::kepler::{orbit_curve, KeplerSolver, DEFAULT_CURVE_RESOLUTION};
use fewbody::math::DVec3;
use fewbody::presets::kozai_lidov;

fn criterion_benchmark(c: &mut Criterion) {
    let solver = KeplerSolver::default();

    c.bench_function("kepler_solve", |b| {
        b.iter(|| {
            let m = black_box(2.3);
            _ = solver.solve(m, black_box(0.5));
        })
    });

    c.bench_function("kepler_solve_high_ecc", |b| {
        b.iter(|| {
            let m = black_box(0.1);
            _ = solver.solve(m, black_box(0.95));
        })
    });

    c.bench_function("orbit_curve", |b| {
        b.iter(|| {
            _ = orbit_curve(
                &solver,
                5.0,
                0.5,
                black_box(1.2),
                black_box(0.4),
                DEFAULT_CURVE_RESOLUTION,
            );
        })
    });

    let masses = [1.4, 0.3, 0.01];
    let positions = [
        DVec3::new(-1.0, 0.2, 0.0),
        DVec3::new(4.0, -0.8, 0.0),
        DVec3::new(12.0, 0.0, 45.0),
    ];

    c.bench_function("accelerations", |b| {
        b.iter(|| {
            _ = accelerations(1.0, &masses, black_box(positions).into_iter());
        })
    });

    c.bench_function("advance_kozai_50yr", |b| {
        b.iter_batched(
            || kozai_lidov().build_simulation().unwrap(),
            |mut sim| {
                _ = sim.advance_to(black_box(50.0));
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
