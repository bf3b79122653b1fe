use criterion::{criterion_group, criterion_main, Criterion};
use filmo_core::tokenizer::stem_text;
use filmo_core::{cosine_similarity_matrix, CountVectorizer};

fn corpus(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let mut words = Vec::new();
            for j in 0..40 {
                words.push(format!("word{}", (i * 7 + j * 13) % 900));
            }
            for _ in 0..3 { words.push(format!("genre{}", i % 12)); }
            for _ in 0..5 { words.push(format!("actor{}", i % 150)); }
            words.join(" ")
        })
        .collect()
}

fn bench_similarity(c: &mut Criterion) {
    let docs = corpus(1000);
    let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    let cv = CountVectorizer::default();
    let (vocab, vectors) = cv.fit_transform(&refs);
    c.bench_function("fit_transform_1000", |b| b.iter(|| cv.fit_transform(&refs)));
    c.bench_function("cosine_matrix_1000", |b| b.iter(|| cosine_similarity_matrix(&vectors, vocab.len())));
    c.bench_function("stem_text", |b| b.iter(|| stem_text(&docs[0])));
}

criterion_group!(benches, bench_similarity);
criterion_main!(benches);
