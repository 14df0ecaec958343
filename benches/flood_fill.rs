use criterion::{Criterion, criterion_group, criterion_main};
use gradient_fill::colour::MatchConfig;
use gradient_fill::draw::line_art;
use gradient_fill::gradient::render_gradient;
use gradient_fill::{Colour, PixelBuffer, Point, Rect, flood_fill};

fn bench_fill(c: &mut Criterion) {
    let source = PixelBuffer::filled(1024, 768, Colour::WHITE);
    let art = line_art(1024, 768);
    let mut write = PixelBuffer::new(1024, 768);
    let cfg = MatchConfig::default();

    c.bench_function("fill_uniform_1024x768", |b| {
        b.iter(|| flood_fill(&source, &mut write, Point::new(512, 384), Colour::BLACK, &cfg, None))
    });
    c.bench_function("fill_line_art_1024x768", |b| {
        b.iter(|| flood_fill(&art, &mut write, Point::new(5, 5), Colour::BLACK, &cfg, None))
    });
}

fn bench_gradient(c: &mut Criterion) {
    let mut surface = PixelBuffer::filled(1024, 768, Colour::BLACK);
    let colours = [Colour::rgb(255, 0, 0), Colour::rgb(0, 255, 0), Colour::rgb(0, 0, 255)];
    c.bench_function("gradient_1024x768", |b| {
        b.iter(|| render_gradient(&mut surface, &colours, 33.0, Rect::new(-100.0, -100.0, 1224.0, 968.0)))
    });
}

criterion_group!(benches, bench_fill, bench_gradient);
criterion_main!(benches);
