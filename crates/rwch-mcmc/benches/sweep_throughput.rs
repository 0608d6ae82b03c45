use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rwch_core::RngHandle;
use rwch_hull::HullOptions;
use rwch_mcmc::stats::Counters;
use rwch_mcmc::Chain;
use rwch_walk::{Observable, Walk, WalkKind, WalkParams};

fn bench_metropolis_sweep(c: &mut Criterion) {
    for (name, kind, d, observable) in [
        ("lattice_2d_volume", WalkKind::Lattice, 2, Observable::Volume),
        ("real_2d_surface", WalkKind::Real, 2, Observable::Surface),
        ("gauss_3d_volume", WalkKind::Gauss, 3, Observable::Volume),
    ] {
        let mut walk = Walk::new(&WalkParams::new(kind, d, 128), HullOptions::default().with_culling(true), 1).unwrap();
        let mut rng = RngHandle::from_seed(2);
        let chain = Chain {
            observable,
            theta: Some(-10.0),
            sweep_len: 128,
        };
        let mut counters = Counters::default();
        c.bench_function(&format!("metropolis_sweep_{name}"), |b| {
            b.iter(|| {
                chain.sweep(&mut walk, &mut rng, &mut counters);
                black_box(counters.tries)
            })
        });
    }
}

criterion_group!(benches, bench_metropolis_sweep);
criterion_main!(benches);
