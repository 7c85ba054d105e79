use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use boxresize::processing::{encode, resize_image, SourceImage};
use boxresize::{ImageFormat, ScaleFactor};
use image::Rgba;

fn gradient(width: u32, height: u32) -> SourceImage {
    SourceImage::from_fn(width, height, |x, y| {
        let r = (x * 65535 / width.max(1)) as u16;
        let g = (y * 65535 / height.max(1)) as u16;
        Rgba([r, g, r ^ g, u16::MAX])
    })
}

fn benchmark_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_image");

    for &(width, height) in &[(640, 480), (1920, 1080)] {
        let source = gradient(width, height);
        for &factor in &[0.25, 0.5, 0.9] {
            let factor = ScaleFactor::new(factor).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("{}x{}", width, height), factor),
                &source,
                |b, source| b.iter(|| resize_image(black_box(source), factor)),
            );
        }
    }

    group.finish();
}

fn benchmark_encode(c: &mut Criterion) {
    let resized = resize_image(&gradient(1920, 1080), ScaleFactor::default());
    let mut group = c.benchmark_group("encode");

    for format in [ImageFormat::Jpeg, ImageFormat::Png] {
        group.bench_function(format.to_string(), |b| {
            b.iter(|| {
                let mut out = Vec::new();
                encode(black_box(&resized), format, &mut out).unwrap();
                out
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_resize, benchmark_encode);
criterion_main!(benches);
