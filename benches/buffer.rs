//! Screen buffer benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use grinder_display::core::{attr, ScreenBuffer, Snapshot};

fn fill(buffer: &mut ScreenBuffer, text: &str) {
    let (width, height) = buffer.size();
    let mut chars = text.chars().cycle();
    for y in 0..height {
        for x in 0..width {
            if let Some(c) = chars.next() {
                buffer.write_char(x, y, c);
            }
        }
    }
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");
    group.throughput(Throughput::Elements(80 * 25));

    group.bench_function("write_full_screen", |b| {
        let mut buffer = ScreenBuffer::new(80, 25);
        b.iter(|| {
            fill(&mut buffer, "The quick brown fox jumps over the lazy dog. ");
            black_box(&buffer);
        })
    });

    group.bench_function("write_with_attrs", |b| {
        let mut buffer = ScreenBuffer::new(80, 25);
        b.iter(|| {
            for y in 0..25 {
                buffer.set_attr(0, if y % 2 == 0 { attr::REVERSE } else { attr::BOLD });
                for x in 0..80 {
                    buffer.write_char(x, y, 'x');
                }
            }
            black_box(&buffer);
        })
    });

    group.finish();
}

fn bench_clear(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");

    group.bench_function("clear_screen", |b| {
        let mut buffer = ScreenBuffer::new(200, 60);
        b.iter(|| {
            buffer.clear_area(0, 0, 199, 59);
            black_box(&buffer);
        })
    });

    // Mostly off-screen rectangles exercise the clipping path
    group.bench_function("clear_clipped", |b| {
        let mut buffer = ScreenBuffer::new(80, 25);
        b.iter(|| {
            for i in -10..10 {
                buffer.clear_area(i * 10, i * 3, i * 10 + 40, i * 3 + 12);
            }
            black_box(&buffer);
        })
    });

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");

    let mut buffer = ScreenBuffer::new(80, 25);
    fill(&mut buffer, "snapshot contents ");

    group.bench_function("snapshot", |b| {
        b.iter(|| black_box(Snapshot::from_buffer(black_box(&buffer))))
    });

    group.bench_function("snapshot_json", |b| {
        let snapshot = Snapshot::from_buffer(&buffer);
        b.iter(|| black_box(snapshot.to_json()))
    });

    group.finish();
}

criterion_group!(benches, bench_write, bench_clear, bench_snapshot);
criterion_main!(benches);
