// Benchmarks for the post-processing pass.
//
// Runs once per interaction after synthesis, on the request path. The score
// map is benched separately since it is the part that scales with block
// count.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};
use yentyo_postprocess::{PostProcessConfig, compute_artifact_score, post_process};
use yentyo_prng::YentRng;

fn test_image(w: u32, h: u32) -> RgbaImage {
    let mut rng = YentRng::new(42);
    RgbaImage::from_fn(w, h, |_, _| {
        let mut byte = || rng.range_u64(0, 256) as u8;
        Rgba([byte(), byte(), byte(), 255])
    })
}

fn bench_postprocess(c: &mut Criterion) {
    let small = test_image(128, 128);
    c.bench_function("post_process_128", |b| {
        b.iter(|| post_process(black_box(&small), "benchmark test words"));
    });

    let large = test_image(512, 512);
    let config = PostProcessConfig::default();
    c.bench_function("artifact_score_512", |b| {
        b.iter(|| compute_artifact_score(black_box(&large), &config));
    });
}

criterion_group!(benches, bench_postprocess);
criterion_main!(benches);
