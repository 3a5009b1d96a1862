//! Interpolation throughput: one frame per render for a long route.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rr_core::{interpolate, Point, ProgressDriver, Route, Speed};

fn long_route(stops: usize) -> Route {
    let mut coordinates = vec![Point::ORIGIN];
    coordinates.extend((1..=stops).map(|i| Point::new((i % 17) as f64, (i / 17) as f64)));
    coordinates.push(Point::ORIGIN);
    let names = (1..=stops)
        .map(|i| format!("L{i}"))
        .chain(std::iter::once(rr_core::RETURN_TO_START.to_string()))
        .collect();
    Route::new(coordinates, names).expect("consistent route")
}

fn bench_interpolate(c: &mut Criterion) {
    let route = long_route(200);

    c.bench_function("interpolate_sweep_200_stops", |b| {
        b.iter(|| {
            let mut progress = 0.0;
            while progress <= 100.0 {
                black_box(interpolate(black_box(&route), progress));
                progress += 0.5;
            }
        })
    });

    c.bench_function("driver_full_run_3x", |b| {
        b.iter(|| {
            let mut driver = ProgressDriver::new(route.clone());
            driver.set_speed(Speed::Triple);
            driver.play().expect("playable route");
            while driver.advance().keeps_running() {}
            black_box(driver.state().visited_stops.len())
        })
    });
}

criterion_group!(benches, bench_interpolate);
criterion_main!(benches);
