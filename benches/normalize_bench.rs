use criterion::{black_box, criterion_group, criterion_main, Criterion};
use htmlshot::document::wrap_document;
use htmlshot::Viewport;

fn bench_wrap_document(c: &mut Criterion) {
    let vp = Viewport::default();
    let fragment = "<div class=\"card\"><h1>Title</h1><p>Body text</p></div>".repeat(50);
    let body_only = format!("<body>{}</body>", fragment);
    let full = format!("<!DOCTYPE html><html><head></head>{}</html>", body_only);

    c.bench_function("wrap_fragment", |b| {
        b.iter(|| wrap_document(black_box(&fragment), vp, "en"))
    });
    c.bench_function("wrap_body_only", |b| {
        b.iter(|| wrap_document(black_box(&body_only), vp, "en"))
    });
    c.bench_function("wrap_full_document", |b| {
        b.iter(|| wrap_document(black_box(&full), vp, "en"))
    });
}

criterion_group!(benches, bench_wrap_document);
criterion_main!(benches);
