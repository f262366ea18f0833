// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Point;
use plotgen::{
    DataSeriesGroup, Graph, GraphConfig, GroupKind, GroupPens, LayoutHints, Stale, StepTraces,
};
use plotgen_view::{DevicePoint, DeviceSize};

/// A decaying cosine per step, sampled like a free induction decay.
fn traces(steps: usize, points: usize) -> StepTraces {
    StepTraces::new(
        (0..steps)
            .map(|s| {
                let phase = s as f64 * 0.1;
                (0..points)
                    .map(|i| {
                        let t = i as f64 / points as f64;
                        Point::new(t, (40.0 * t + phase).cos() * (-3.0 * t).exp())
                    })
                    .collect()
            })
            .collect(),
    )
}

fn graph(steps: usize, points: usize) -> Graph {
    let mut graph = Graph::new(GraphConfig::default());
    graph.add_group(DataSeriesGroup::new(
        "Real",
        GroupKind::Numbered,
        Box::new(traces(steps, points)),
        LayoutHints::NONDECREASING_X | LayoutHints::SYMMETRIC_Y_RANGE,
        GroupPens::default(),
    ));
    graph.set_scale(DeviceSize::new(1200, 800));
    graph
}

fn bench_curve_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("plotgen_curve_set");
    group.sample_size(20);

    for &(steps, points) in &[(8_usize, 65_536_usize), (128, 4_096)] {
        group.bench_function(format!("rebuild(steps={steps},n={points})"), |b| {
            b.iter_batched(
                || graph(steps, points),
                |mut graph| {
                    graph.mark_old(Stale::all(), 0);
                    black_box(graph.optimized_curve_set().len())
                },
                BatchSize::LargeInput,
            );
        });

        let mut g = graph(steps, points);
        group.bench_function(format!("zoom(steps={steps},n={points})"), |b| {
            let mut zoom_in = true;
            b.iter(|| {
                g.zoom(zoom_in, true, false, DevicePoint::new(600, 400));
                zoom_in = !zoom_in;
                black_box(g.optimized_curve_set().len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_curve_set);
criterion_main!(benches);
