use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pagemark_core::{MarkdownSerializer, extract_article, normalize_markdown};

fn bench_extract(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/article.html").unwrap();

    c.bench_function("extract_article", |b| {
        b.iter(|| extract_article(black_box(&html), "https://example.com/docs/install"))
    });
}

fn bench_serialize(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/article.html").unwrap();
    let article = extract_article(&html, "https://example.com/docs/install").unwrap();
    let serializer = MarkdownSerializer::default();

    c.bench_function("serialize_markdown", |b| {
        b.iter(|| serializer.serialize(black_box(&article.content_html)))
    });
}

fn bench_normalize(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/article.html").unwrap();
    let article = extract_article(&html, "https://example.com/docs/install").unwrap();
    let markdown = MarkdownSerializer::default().serialize(&article.content_html);

    c.bench_function("normalize_markdown", |b| b.iter(|| normalize_markdown(black_box(&markdown))));
}

fn bench_full_conversion(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/article.html").unwrap();
    let serializer = MarkdownSerializer::default();

    c.bench_function("full_conversion", |b| {
        b.iter(|| {
            let article = extract_article(black_box(&html), "https://example.com/docs/install").unwrap();
            let body = serializer.serialize(&article.content_html);
            normalize_markdown(&body)
        })
    });
}

criterion_group!(
    benches,
    bench_extract,
    bench_serialize,
    bench_normalize,
    bench_full_conversion
);
criterion_main!(benches);
