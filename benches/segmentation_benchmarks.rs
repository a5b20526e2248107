use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::HashMap;
use std::sync::Arc;
use wordguard::dictionary::{word_cost, ChunkPayload, MemoryChunkSource};
use wordguard::{
    sanitize, segment, Blacklist, ChunkManifest, DictionaryStore, Guard, MemoryBlacklistStore,
    ValidateOptions,
};

const WORDS: &[&str] = &[
    "the", "of", "and", "to", "a", "in", "is", "it", "you", "that", "he", "was", "for", "on",
    "are", "with", "as", "i", "his", "they", "be", "at", "one", "have", "this", "from", "word",
    "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "hello", "world", "test", "string",
    "water", "people", "number", "first", "time", "long", "make", "thing", "look", "more",
];

const DICTIONARY_LENGTH: u64 = 200_000;

fn cost_table() -> HashMap<&'static str, f64> {
    WORDS
        .iter()
        .enumerate()
        .map(|(rank, word)| (*word, word_cost(rank as u64, DICTIONARY_LENGTH)))
        .collect()
}

/// Run-together text of `words` dictionary words
fn generate_text(words: usize) -> String {
    (0..words).map(|i| WORDS[(i * 7) % WORDS.len()]).collect()
}

fn build_guard() -> Guard {
    let manifest = ChunkManifest::reference();
    let mut payloads: HashMap<String, ChunkPayload> = manifest
        .ranges()
        .iter()
        .map(|range| (range.id(), ChunkPayload::new()))
        .collect();

    for (rank, word) in WORDS.iter().enumerate() {
        for range in manifest.resolve(word) {
            if let Some(payload) = payloads.get_mut(&range.id()) {
                payload.insert(word.to_string(), DICTIONARY_LENGTH - rank as u64);
            }
        }
    }

    let mut source = MemoryChunkSource::new();
    for (id, payload) in &payloads {
        source.insert(id.clone(), payload).unwrap();
    }

    Guard::new(
        Arc::new(MemoryBlacklistStore::new(Blacklist {
            common: vec!["lazy".to_string()],
            ..Default::default()
        })),
        DictionaryStore::new(manifest, Arc::new(source)),
    )
}

fn benchmark_segment(c: &mut Criterion) {
    let costs = cost_table();
    let mut group = c.benchmark_group("segment");

    for words in [4, 16, 64] {
        let text = generate_text(words);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(words), &text, |b, text| {
            b.iter(|| segment(black_box(text), &costs, 29).unwrap())
        });
    }

    group.finish();
}

fn benchmark_sanitize(c: &mut Criterion) {
    let input = "7h3 qu1ck br0wn f0x jump5 0v3r 7h3 l4zy d06 ".repeat(8);

    c.bench_function("sanitize_with_mapping", |b| {
        b.iter(|| sanitize(black_box(&input), true))
    });
    c.bench_function("sanitize_without_mapping", |b| {
        b.iter(|| sanitize(black_box(&input), false))
    });
}

fn benchmark_validate(c: &mut Criterion) {
    let guard = build_guard();
    let mut group = c.benchmark_group("validate");

    for words in [4, 16] {
        let text = generate_text(words);
        group.bench_with_input(BenchmarkId::from_parameter(words), &text, |b, text| {
            b.iter(|| {
                guard
                    .validate(black_box(text), ValidateOptions::default())
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_segment,
    benchmark_sanitize,
    benchmark_validate
);
criterion_main!(benches);
