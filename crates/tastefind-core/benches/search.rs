//! Benchmarks for ranking operations (TF-IDF, embeddings, hybrid pipeline).
//!
//! Run with: `cargo bench -p tastefind-core --bench search`
//!
//! These benchmarks measure the performance of:
//! - Lexical ranking against corpora of increasing size
//! - The relevance cascade on a single candidate
//! - The full hybrid search (both rankers, fusion, relevance, sort)
//! - Aggregate evaluation of one category
//!
//! The hashing encoder stands in for BERT so timings reflect the ranking
//! code rather than model inference.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tastefind_core::config::{EvaluationConfig, RankingConfig};
use tastefind_core::corpus::{Category, Document, MetadataStore};
use tastefind_core::embedding::{EncoderHandle, HashingEncoder};
use tastefind_core::evaluation::EvaluationEngine;
use tastefind_core::search::{
    CategoryIndex, DocId, HybridSearchEngine, LexicalRanker, RelevanceScorer, SearchRequest,
    DEFAULT_MAX_FEATURES,
};
use tastefind_core::text::NormalizationSpec;

const ENCODER_DIM: usize = 384;

// =============================================================================
// Test Data Generation
// =============================================================================

/// Deterministic recipe text. Dish, method and ingredients rotate with `id`
/// so term frequencies vary across the corpus.
fn sample_recipe(id: usize) -> Document {
    let dishes = ["ayam", "ikan", "sapi", "tahu", "tempe", "udang", "cumi"];
    let methods = ["goreng", "bakar", "rebus", "kukus", "tumis"];
    let spices = [
        "bawang putih, bawang merah, kemiri",
        "kunyit, jahe, lengkuas, serai",
        "cabai merah, tomat, terasi",
        "kecap manis, merica, pala",
    ];
    let dish = dishes[id % dishes.len()];
    let method = methods[(id / dishes.len()) % methods.len()];
    let spice = spices[id % spices.len()];

    Document::new(
        DocId::from_index(id),
        Category::Food,
        format!("{} {} spesial {}", dish.to_uppercase(), method, id),
        format!(
            "Bahan: 500 gram {dish}, {spice}, garam secukupnya. \
             Langkah: haluskan bumbu, lumuri {dish}, diamkan 30 menit. \
             {method} {dish} hingga matang dan harum. Sajikan dengan nasi hangat \
             dan sambal. Resep nomor {id}.",
        ),
    )
}

fn build_index(size: usize) -> CategoryIndex {
    let metadata =
        MetadataStore::from_documents(Category::Food, (0..size).map(sample_recipe).collect());
    CategoryIndex::build(
        metadata,
        NormalizationSpec::default(),
        DEFAULT_MAX_FEATURES,
        &HashingEncoder::new(ENCODER_DIM),
    )
    .unwrap()
}

fn build_engine(size: usize) -> HybridSearchEngine {
    HybridSearchEngine::new(
        RankingConfig::default(),
        Arc::new(EncoderHandle::ready(Arc::new(HashingEncoder::new(
            ENCODER_DIM,
        )))),
    )
    .unwrap()
    .with_index(build_index(size))
}

// =============================================================================
// Lexical Ranking Benchmarks
// =============================================================================

/// Benchmark: TF-IDF ranking as the corpus grows.
fn bench_lexical_by_corpus_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexical/rank_by_size");

    for size in [100, 500, 2000] {
        let index = build_index(size);
        let config = RankingConfig::default();
        let ranker = LexicalRanker::new(index.lexical(), config.lexical_min_score);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ranker.rank(black_box("ayam bakar kecap"), config.candidate_pool));
        });
    }

    group.finish();
}

// =============================================================================
// Relevance Cascade Benchmarks
// =============================================================================

/// Benchmark: one cascade evaluation per tier.
///
/// The exact-title tier returns after a substring check; the conflict tier
/// tokenizes the whole document.
fn bench_relevance_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("relevance/score");
    let scorer = RelevanceScorer::new(&RankingConfig::default());
    let doc = sample_recipe(7);

    for (name, query) in [
        ("exact_title", "ikan goreng"),
        ("all_tokens", "ikan hangat"),
        ("conflict", "ikan bakar"),
        ("weak", "ikan pepes daun pisang"),
    ] {
        let profile = scorer.profile(query);
        group.bench_function(name, |b| {
            b.iter(|| scorer.score(black_box(&profile), black_box(&doc)));
        });
    }

    group.finish();
}

// =============================================================================
// Hybrid Search Benchmarks
// =============================================================================

/// Benchmark: full hybrid search with varying `top_k`.
///
/// The candidate pool is fixed, so `top_k` only changes the final truncation.
fn bench_hybrid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("hybrid/search_by_k");
    let engine = build_engine(1000);

    for k in [1, 10, 30] {
        let request = SearchRequest::new("sapi rebus kunyit", Category::Food, k);
        group.bench_with_input(BenchmarkId::from_parameter(k), &request, |b, request| {
            b.iter(|| engine.search(black_box(request)).unwrap());
        });
    }

    group.finish();
}

// =============================================================================
// Evaluation Benchmarks
// =============================================================================

/// Benchmark: aggregate evaluation over a small sample.
fn bench_aggregate_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation/aggregate");
    group.sample_size(10);
    let engine = build_engine(500);
    let evaluator = EvaluationEngine::new(&engine).with_config(EvaluationConfig {
        sample_size: 5,
        ..EvaluationConfig::default()
    });

    group.bench_function("sample_5", |b| {
        b.iter(|| evaluator.evaluate(Category::Food).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexical_by_corpus_size,
    bench_relevance_cascade,
    bench_hybrid_search,
    bench_aggregate_evaluation,
);
criterion_main!(benches);
