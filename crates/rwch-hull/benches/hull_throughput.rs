use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rwch_core::{RngHandle, Step};
use rwch_hull::{HullAlgorithm, HullEngine, HullOptions};

fn lattice_trace(d: usize, steps: usize, seed: u64) -> Vec<Step<f64>> {
    let mut rng = RngHandle::from_seed(seed);
    let mut p = Step::<i64>::zero(d);
    let mut trace = vec![p.to_f64()];
    for _ in 0..steps {
        p += &Step::<i64>::lattice(d, rng.uniform());
        trace.push(p.to_f64());
    }
    trace
}

fn bench_planar(c: &mut Criterion) {
    let trace = lattice_trace(2, 2048, 7);
    for (name, algorithm, cull) in [
        ("library", HullAlgorithm::Library, false),
        ("andrew", HullAlgorithm::Andrew, false),
        ("andrew_akl", HullAlgorithm::Andrew, true),
        ("jarvis_akl", HullAlgorithm::Jarvis, true),
    ] {
        let mut engine = HullEngine::new(HullOptions::new(algorithm).with_culling(cull));
        c.bench_function(&format!("hull_2d_{name}"), |b| {
            b.iter(|| black_box(engine.compute(black_box(&trace)).unwrap().a()))
        });
    }
}

fn bench_spatial(c: &mut Criterion) {
    let trace = lattice_trace(3, 512, 11);
    let mut engine = HullEngine::new(HullOptions::default().with_culling(true));
    c.bench_function("hull_3d_library_akl", |b| {
        b.iter(|| black_box(engine.compute(black_box(&trace)).unwrap().l()))
    });
}

criterion_group!(benches, bench_planar, bench_spatial);
criterion_main!(benches);
