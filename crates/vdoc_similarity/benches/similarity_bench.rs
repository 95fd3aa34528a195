use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vdoc_similarity::{fuzzy_similarity, ngram_similarity, preprocess};

fn sample_text(words: usize) -> String {
    const VOCAB: &[&str] = &[
        "the", "study", "of", "plagiarism", "detection", "relies", "on", "overlapping",
        "shingles", "and", "semantic", "vectors", "derived", "from", "documents",
    ];
    (0..words)
        .map(|i| VOCAB[i % VOCAB.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_metrics(c: &mut Criterion) {
    let a = preprocess(&sample_text(2_000));
    let b = preprocess(&sample_text(1_900));

    c.bench_function("ngram_similarity_2k_words", |bencher| {
        bencher.iter(|| ngram_similarity(black_box(&a), black_box(&b)))
    });

    let short_a = preprocess(&sample_text(300));
    let short_b = preprocess(&sample_text(280));
    c.bench_function("fuzzy_similarity_300_words", |bencher| {
        bencher.iter(|| fuzzy_similarity(black_box(&short_a), black_box(&short_b)))
    });
}

criterion_group!(benches, bench_metrics);
criterion_main!(benches);
