// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use plotgen_curve::{
    CoordinateLimit, Curve, CurveRef, PenId, crop_x_range, crop_x_range_linear, optimize,
};
use plotgen_view::{DevicePoint, DeviceRect};

struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }
}

/// A curve with nondecreasing x and uneven spacing, like a peak-picked spectrum.
fn monotone_points(n: usize, seed: u64) -> Vec<DevicePoint> {
    let mut rng = Lcg::new(seed);
    let mut x = 0_i32;
    (0..n)
        .map(|_| {
            x += (rng.next_u32() % 4) as i32;
            DevicePoint::new(x, (rng.next_u32() % 1000) as i32)
        })
        .collect()
}

fn bench_crop(c: &mut Criterion) {
    let mut group = c.benchmark_group("plotgen_crop");
    for &n in &[10_000_usize, 1_000_000] {
        let points = monotone_points(n, 0x5EED_0000_0000_0001);
        let last = points[n - 1].x;
        let (left, right) = (last / 3, last / 3 + 800);

        group.bench_function(format!("galloping(n={n})"), |b| {
            b.iter(|| black_box(crop_x_range(black_box(&points), left, right)));
        });
        group.bench_function(format!("linear(n={n})"), |b| {
            b.iter(|| black_box(crop_x_range_linear(black_box(&points), left, right)));
        });
    }
    group.finish();
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("plotgen_optimize");
    for &steps in &[16_usize, 256] {
        let set: Vec<_> = (0..steps)
            .map(|s| {
                let curve = Curve::from_points(monotone_points(50_000, s as u64), true);
                CurveRef::whole(Rc::new(curve), PenId(0))
            })
            .collect();
        let buffer = DeviceRect::new(20_000, 0, 21_500, 999);
        let mut out = Vec::with_capacity(steps);

        for limit in [CoordinateLimit::Wide, CoordinateLimit::Signed16] {
            group.bench_function(format!("{limit:?}(steps={steps})"), |b| {
                b.iter(|| {
                    optimize(black_box(&set), &buffer, limit, &mut out);
                    black_box(out.len())
                });
            });
        }
    }
    group.finish();
}

fn bench_simplify(c: &mut Criterion) {
    // Quantized data: runs of up to eight equal points.
    let mut rng = Lcg::new(0xD0_0D);
    let mut x = 0;
    let points: Vec<_> = (0..200_000)
        .map(|_| {
            if rng.next_u32() % 8 == 0 {
                x += 1;
            }
            DevicePoint::new(x, 0)
        })
        .collect();

    c.bench_function("plotgen_simplify", |b| {
        b.iter(|| {
            let mut curve = Curve::from_points(points.clone(), true);
            curve.simplify();
            black_box(curve.len())
        });
    });
}

criterion_group!(benches, bench_crop, bench_optimize, bench_simplify);
criterion_main!(benches);
