// Benchmarks for per-input scoring cost.
//
// `compute_dissonance` runs twice per interaction (once per role) on the
// request path, so it should stay well under a millisecond even after the
// word cloud has grown over a long session.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use yentyo_core::{DissonanceEngine, EngineConfig};

const INPUTS: &[&str] = &[
    "hello world",
    "the meaning of life is to find your gift",
    "I hate everything and everyone",
    "a",
    "revolution will not be televised",
];

fn bench_dissonance(c: &mut Criterion) {
    c.bench_function("compute_dissonance_rotating", |b| {
        let mut engine = DissonanceEngine::new(EngineConfig::default(), 42).unwrap();
        let mut i = 0usize;
        b.iter(|| {
            let out = engine.compute_dissonance(black_box(INPUTS[i % INPUTS.len()]));
            i += 1;
            out
        });
    });

    c.bench_function("compute_dissonance_large_cloud", |b| {
        let mut engine = DissonanceEngine::new(EngineConfig::default(), 42).unwrap();
        for n in 0..2_000 {
            engine.compute_dissonance(&format!("word{n} other{} third{}", n * 7, n * 13));
        }
        b.iter(|| engine.compute_dissonance(black_box("a fresh sentence about nothing")));
    });
}

criterion_group!(benches, bench_dissonance);
criterion_main!(benches);
