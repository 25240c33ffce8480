use criterion::{criterion_group, criterion_main, Criterion};
use sketchpad::bitmap::Bitmap;
use sketchpad::{Brush, Color, Point};

fn bench_segments(c: &mut Criterion) {
    let mut bitmap = Bitmap::new(1280, 800);
    let thin = Brush {
        color: Color::rgb(20, 20, 20),
        width: 2,
        erase: false,
    };
    let thick = Brush {
        color: Color::rgb(20, 20, 20),
        width: 48,
        erase: false,
    };

    c.bench_function("segment_diagonal_w2", |b| {
        b.iter(|| bitmap.stroke_segment(Point::new(10.0, 10.0), Point::new(1260.0, 780.0), &thin))
    });
    c.bench_function("segment_diagonal_w48", |b| {
        b.iter(|| bitmap.stroke_segment(Point::new(10.0, 10.0), Point::new(1260.0, 780.0), &thick))
    });
    c.bench_function("segment_short_w48", |b| {
        b.iter(|| bitmap.stroke_segment(Point::new(600.0, 400.0), Point::new(612.0, 404.0), &thick))
    });
}

fn bench_snapshot_capture(c: &mut Criterion) {
    let mut bitmap = Bitmap::new(640, 480);
    let brush = Brush {
        color: Color::rgb(200, 40, 40),
        width: 8,
        erase: false,
    };
    for i in 0..40 {
        let y = (i * 12) as f32;
        bitmap.stroke_segment(Point::new(0.0, y), Point::new(639.0, y), &brush);
    }

    c.bench_function("snapshot_encode_640x480", |b| {
        b.iter(|| sketchpad::Snapshot::encode(&bitmap).expect("encode"))
    });
}

criterion_group!(benches, bench_segments, bench_snapshot_capture);
criterion_main!(benches);
