// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Size};
use understory_backdrop::{AreaRegistry, AreaTracker, LayoutLifecycle, TrackerConfig};

#[derive(Clone)]
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

    fn next_coord(&mut self) -> f64 {
        f64::from(self.next_u32() % 2_048)
    }
}

fn attached_trackers(
    n: u32,
    dirty_tracking: bool,
) -> (Arc<AreaRegistry<u32>>, Vec<AreaTracker<u32>>) {
    let mut registry = AreaRegistry::with_capacity(n as usize);
    if dirty_tracking {
        registry = registry.with_dirty_tracking();
    }
    let registry = Arc::new(registry);
    let trackers = (0..n)
        .map(|key| {
            let mut tracker = TrackerConfig::new(key, &registry).create();
            tracker.on_attach();
            tracker.on_remeasured(Size::new(64.0, 32.0));
            tracker
        })
        .collect();
    (registry, trackers)
}

fn bench_backdrop(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_backdrop");
    group.sample_size(50);

    for &n in &[64_u32, 1_024_u32] {
        group.bench_function(format!("layout_pass_moved(n={n})"), |b| {
            b.iter_batched(
                || (attached_trackers(n, false), Lcg::new(0xB1A5_0000_0000_0001)),
                |((registry, mut trackers), mut rng)| {
                    for tracker in &mut trackers {
                        tracker.on_placed(Point::new(rng.next_coord(), rng.next_coord()));
                    }
                    black_box(registry.revision());
                },
                BatchSize::LargeInput,
            );
        });

        // Re-placing at the same position is the common steady-state frame.
        group.bench_function(format!("layout_pass_unchanged(n={n})"), |b| {
            b.iter_batched(
                || {
                    let (registry, mut trackers) = attached_trackers(n, false);
                    for tracker in &mut trackers {
                        tracker.on_placed(Point::ZERO);
                    }
                    (registry, trackers)
                },
                |(registry, mut trackers)| {
                    for tracker in &mut trackers {
                        tracker.on_placed(Point::ZERO);
                    }
                    black_box(registry.revision());
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("snapshot(n={n})"), |b| {
            let (registry, _trackers) = attached_trackers(n, false);
            b.iter(|| black_box(registry.snapshot().len()));
        });

        group.bench_function(format!("snapshot_if_unchanged(n={n})"), |b| {
            let (registry, _trackers) = attached_trackers(n, false);
            let revision = registry.revision();
            b.iter(|| black_box(registry.snapshot_if_changed(revision).is_none()));
        });

        group.bench_function(format!("take_dirty_after_pass(n={n})"), |b| {
            b.iter_batched(
                || attached_trackers(n, true),
                |(registry, _trackers)| black_box(registry.take_dirty().len()),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_backdrop);
criterion_main!(benches);
