//! Performance benchmarks for the Orbit shell core
//!
//! Covers the operations that run on every pointer event: surface picking,
//! output voting and pointer routing.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use orbit::backend::HeadlessBackend;
use orbit::compositor::{OutputId, SeatId};
use orbit::geometry::{Point, Rectangle};
use orbit::output_selection::{select_output, Candidate};
use orbit::session::LoggingSession;
use orbit::{Shell, ShellSettings};

fn desktop(windows: usize) -> (Shell, SeatId) {
    let mut shell = Shell::new(
        ShellSettings::default(),
        Box::new(HeadlessBackend::new()),
        Box::new(LoggingSession::new()),
    );
    let full = Rectangle::new(0, 0, 1920, 1080);
    shell.add_output("HEADLESS-1", full, full);
    let seat = shell.add_seat("seat0");
    let client = shell.connect_client(4242);
    for _ in 0..windows {
        let surface = shell.create_surface(Some(client)).unwrap();
        shell.create_shell_surface(surface).unwrap();
        shell.set_toplevel(surface).unwrap();
        shell.commit_surface(surface, 300, 200).unwrap();
    }
    (shell, seat)
}

fn bench_pick_surface(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick_surface");

    for window_count in [10, 100, 500].iter() {
        let (shell, _seat) = desktop(*window_count);
        group.bench_function(format!("pick_among_{}_windows", window_count), |b| {
            b.iter(|| black_box(shell.pick_surface(black_box(Point::new(150.0, 150.0)))))
        });
    }

    group.finish();
}

fn bench_output_voting(c: &mut Criterion) {
    let mut group = c.benchmark_group("output_voting");

    let candidates: Vec<Candidate> = (0..4)
        .map(|i| Candidate::new(OutputId(i), Rectangle::new(i as i32 * 1920, 0, 1920, 1080)))
        .collect();
    for pointer_count in [1, 16, 256].iter() {
        let pointers: Vec<Point> = (0..*pointer_count)
            .map(|i| Point::new((i * 97 % 7680) as f64, 540.0))
            .collect();
        group.bench_function(format!("{}_pointers", pointer_count), |b| {
            b.iter(|| black_box(select_output(&candidates, &pointers)))
        });
    }

    group.finish();
}

fn bench_pointer_routing(c: &mut Criterion) {
    c.bench_function("pointer_motion_over_100_windows", |b| {
        b.iter_batched(
            || desktop(100),
            |(mut shell, seat)| {
                for step in 0..50 {
                    let position = Point::new(step as f64 * 10.0, 100.0);
                    shell.handle_pointer_motion(seat, step, position).unwrap();
                }
                black_box(shell)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_pick_surface, bench_output_voting, bench_pointer_routing);
criterion_main!(benches);
