//! # Vision Pipeline Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};

use robot_lib::targeting::{pipeline, ChannelBounds, Params, ThresholdType};

fn vision_benchmark(c: &mut Criterion) {
    // ---- Build a synthetic frame ----

    let params = Params {
        threshold_type: ThresholdType::Rgb,
        plane_1: ChannelBounds::new(0, 50),
        plane_2: ChannelBounds::new(200, 255),
        plane_3: ChannelBounds::new(0, 50),
        ..Params::default()
    };

    let green = Rgb([10, 230, 20]);

    // Three ring targets stacked as on the goal wall, plus some speckle
    let frame = RgbImage::from_fn(320, 240, |x, y| {
        let rings = [(40, 20, 124, 40), (60, 100, 124, 58), (100, 180, 74, 64)];

        let on_ring = rings.iter().any(|&(rx, ry, w, h)| {
            let inside = x >= rx && x < rx + w && y >= ry && y < ry + h;
            let border = x < rx + 6 || x >= rx + w - 6 || y < ry + 6 || y >= ry + h - 6;
            inside && border
        });

        if on_ring || (x * 7 + y * 13) % 97 == 0 {
            green
        } else {
            Rgb([40, 40, 40])
        }
    });

    // ---- Benchmark ----

    c.bench_function("pipeline::process 320x240", |b| {
        b.iter(|| pipeline::process(black_box(&frame), black_box(&params)))
    });
}

criterion_group!(benches, vision_benchmark);
criterion_main!(benches);
