//! Performance benchmarks for the Canopy window manager core
//!
//! These benchmarks cover the per-frame paths (drag updates, snap
//! resolution, render lists) and the launch path, so regressions show up
//! before they turn into dropped frames.

use canopy::config::{CanopyConfig, PlacementConfig, SnapConfig, WindowConfig};
use canopy::geometry::{Point, Viewport};
use canopy::interaction::{PointerTarget, SnapZoneResolver};
use canopy::registry::{Session, StaticRegistry, TierGate};
use canopy::{Desktop, MemoryStore, OpenOutcome, WindowManager};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn manager() -> WindowManager {
    WindowManager::new(
        &WindowConfig {
            max_open_windows: 1000,
            ..WindowConfig::default()
        },
        &PlacementConfig::default(),
        Viewport::new(1920, 1080, 28, 64),
        Arc::new(StaticRegistry::builtin()),
        Arc::new(TierGate),
        Session::default(),
    )
}

/// Benchmark window launches with cascade placement
fn bench_open_windows(c: &mut Criterion) {
    let mut group = c.benchmark_group("open_windows");

    for window_count in [10, 100, 500].iter() {
        group.bench_with_input(
            format!("open_{}_windows", window_count),
            window_count,
            |b, &window_count| {
                b.iter_batched(
                    manager,
                    |mut wm| {
                        for _ in 0..window_count {
                            black_box(wm.open_window("notes"));
                        }
                        wm
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark focus changes across a crowded stack
fn bench_focus_cycling(c: &mut Criterion) {
    let mut wm = manager();
    let ids: Vec<_> = (0..200)
        .filter_map(|_| wm.open_window("notes").window_id())
        .collect();

    c.bench_function("focus_cycle_200_windows", |b| {
        b.iter(|| {
            for id in &ids {
                black_box(wm.focus_window(*id));
            }
        })
    });
}

/// Benchmark snap zone lookups for a pointer sweeping the viewport
fn bench_snap_resolution(c: &mut Criterion) {
    let resolver = SnapZoneResolver::new(&SnapConfig::default());
    let viewport = Viewport::new(1920, 1080, 28, 64);

    c.bench_function("snap_zone_sweep", |b| {
        b.iter(|| {
            for step in 0..200 {
                let x = step as f64 * 9.6;
                black_box(resolver.zone_at(Point::new(x, 30.0 + x / 2.0), &viewport));
            }
        })
    });
}

/// Benchmark a full drag gesture through the desktop shell
fn bench_drag_gesture(c: &mut Criterion) {
    c.bench_function("drag_gesture_120_frames", |b| {
        b.iter_batched(
            || {
                let mut desktop =
                    Desktop::from_config(CanopyConfig::default(), Box::new(MemoryStore::new()));
                let id = match desktop.launch("notes", Instant::now()) {
                    OpenOutcome::Opened(id) => Some(id),
                    _ => None,
                };
                (desktop, id)
            },
            |(mut desktop, id)| {
                let Some(id) = id else { return };
                desktop.pointer_down(id, PointerTarget::TitleBar, Point::new(300.0, 80.0));
                for frame in 0..120 {
                    let offset = frame as f64 * 4.0;
                    black_box(desktop.pointer_move(id, Point::new(300.0 + offset, 80.0 + offset / 2.0)));
                }
                black_box(desktop.pointer_up(id));
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark render list generation while windows animate
fn bench_render_list(c: &mut Criterion) {
    let mut config = CanopyConfig::default();
    config.window.max_open_windows = 100;
    let mut desktop = Desktop::from_config(config, Box::new(MemoryStore::new()));
    let start = Instant::now();

    let ids: Vec<_> = (0..50)
        .filter_map(|_| desktop.launch("notes", start).window_id())
        .collect();
    desktop.tick(start);
    for id in ids.iter().step_by(2) {
        desktop.minimize(*id);
    }
    desktop.tick(start);

    let mid_animation = start + Duration::from_millis(150);
    c.bench_function("render_list_50_windows", |b| {
        b.iter(|| black_box(desktop.render_list(mid_animation)))
    });
}

criterion_group!(
    benches,
    bench_open_windows,
    bench_focus_cycling,
    bench_snap_resolution,
    bench_drag_gesture,
    bench_render_list
);
criterion_main!(benches);
