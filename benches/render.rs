use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{GrayImage, RgbaImage};
use mandelbrot::{base_transform, required_scale, Colorizer, Evaluator, Renderer};
use num::complex::Complex64;

fn evaluate(c: &mut Criterion) {
    let point = Complex64::new(-1.0, 0.15);
    c.bench_function("evaluate square", |b| {
        let evaluator = Evaluator::new(1000);
        b.iter(|| evaluator.evaluate(black_box(point)))
    });

    let mut group = c.benchmark_group("evaluate power");
    let point = Complex64::new(0.1, 0.1);
    for power in &[3.0, 8.0, 15.0, 20.0, 21.0, 100.0, 2.5, 21.5] {
        let evaluator = Evaluator::with_power(1000, *power);
        group.bench_with_input(BenchmarkId::from_parameter(power), power, |b, _| {
            b.iter(|| evaluator.evaluate(black_box(point)))
        });
    }
    group.finish();
}

fn render(c: &mut Criterion) {
    let (w, h) = (256, 256);
    let transform = base_transform(w, h, 1.0, required_scale(w, h), Complex64::new(0.0, 0.0));
    let evaluator = Evaluator::new(500);

    c.bench_function("render single band", |b| {
        let renderer = Renderer::new(1).unwrap();
        let colorizer = Colorizer::binary(false);
        let mut image = GrayImage::new(w, h);
        b.iter(|| renderer.render(&mut image, &transform, &evaluator, &colorizer))
    });

    c.bench_function("render auto bands", |b| {
        let renderer = Renderer::auto();
        let colorizer = Colorizer::rainbow(16, 0).unwrap();
        let mut image = RgbaImage::new(w, h);
        b.iter(|| renderer.render(&mut image, &transform, &evaluator, &colorizer))
    });
}

criterion_group!(benches, evaluate, render);
criterion_main!(benches);
