//! Benchmarks for the ranking pipeline (BM25, composite ranking, dedup, sort).
//!
//! Run with: `cargo bench -p scholar-aggregator --bench ranking`

use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use scholar_aggregator::config::{Bm25Params, RankingWeights};
use scholar_aggregator::models::{Article, EnhancedArticle, SortOption};
use scholar_aggregator::pipeline::relevance::bm25::bm25_relevance;
use scholar_aggregator::pipeline::{deduplicate, rank_article, sort_articles};

const QUERY: &str = "quantum error correction surface codes";

const TOPICS: [&str; 6] = [
    "surface codes for quantum error correction with logical qubits",
    "graphene transistors and two dimensional materials",
    "attention mechanisms in transformer language models",
    "topological phases of matter and anyonic statistics",
    "decoding algorithms for stabilizer codes under noise",
    "protein folding with deep learning and structure prediction",
];

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default()
}

/// Deterministic synthetic corpus; every seventh article repeats an earlier DOI.
fn corpus(size: usize) -> Vec<Article> {
    (0..size)
        .map(|i| {
            let topic = TOPICS[i % TOPICS.len()];
            let doi_index = if i % 7 == 6 { i - 3 } else { i };
            Article {
                doi: format!("10.1000/bench.{doi_index}"),
                title: format!("{} ({i})", topic.split_whitespace().take(4).collect::<Vec<_>>().join(" ")),
                r#abstract: format!("{topic}. We study {topic} in setting {i}."),
                journal: format!("Journal {}", i % 11),
                date: format!("{}-{:02}", 2000 + i % 25, 1 + i % 12),
                citation_count: (i as u64 * 37) % 2_000,
                ..Default::default()
            }
        })
        .collect()
}

fn documents(articles: &[Article]) -> Vec<String> {
    articles.iter().map(|a| format!("{} {}", a.title, a.r#abstract)).collect()
}

fn bench_bm25(c: &mut Criterion) {
    let mut group = c.benchmark_group("bm25");
    for size in [25, 100, 500] {
        let docs = documents(&corpus(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &docs, |b, docs| {
            b.iter(|| bm25_relevance(black_box(QUERY), black_box(docs), Bm25Params::default()));
        });
    }
    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let weights = RankingWeights::default();
    let today = today();

    let mut group = c.benchmark_group("rank");
    for size in [25, 100, 500] {
        let articles = corpus(size);
        let relevance = bm25_relevance(QUERY, &documents(&articles), Bm25Params::default());
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &articles, |b, articles| {
            b.iter(|| {
                articles
                    .iter()
                    .zip(&relevance)
                    .map(|(article, &score)| rank_article(QUERY, article, score, today, &weights))
                    .sum::<f64>()
            });
        });
    }
    group.finish();
}

fn bench_dedup_and_sort(c: &mut Criterion) {
    let today = today();
    let articles = corpus(500);
    let enhanced: Vec<EnhancedArticle> = articles
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, article)| EnhancedArticle {
            relevance_score: (i % 10) as f64 / 10.0,
            ranking_score: (i % 17) as f64 / 17.0,
            ..EnhancedArticle::unscored(article)
        })
        .collect();

    c.bench_function("dedup/500", |b| {
        b.iter(|| deduplicate(black_box(articles.clone())));
    });

    let mut group = c.benchmark_group("sort/500");
    for option in [SortOption::Relevance, SortOption::CitationCount, SortOption::Date] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{option:?}")), &enhanced, |b, enhanced| {
            b.iter(|| {
                let mut view = enhanced.clone();
                sort_articles(&mut view, option, today);
                view
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bm25, bench_rank, bench_dedup_and_sort);
criterion_main!(benches);
